//! Plain HTTP listener.

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::lifecycle::serve_with_shutdown;
use super::{ServerError, ServerResult, shutdown_signal};
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};
use crate::config::ServerConfig;

/// Binds the configured address and serves `app` until a shutdown signal.
///
/// In-flight requests get [`ServerConfig::shutdown_timeout`] to finish once
/// the signal arrives; the server returns after that even if some remain.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the address cannot be
/// bound, or the server fails while running.
pub async fn serve_http(app: Router, server_config: ServerConfig) -> ServerResult<()> {
    server_config
        .validate()
        .map_err(|err| ServerError::invalid_config(&err))?;

    let server_addr = server_config.server_addr();
    let listener = TcpListener::bind(server_addr).await.map_err(|err| {
        tracing::error!(
            target: TRACING_TARGET_SERVER_STARTUP,
            addr = %server_addr,
            error = %err,
            "failed to bind to address"
        );

        ServerError::bind_error(server_addr, err)
    })?;

    let shutdown_timeout = server_config.shutdown_timeout();
    let shutdown_started = Arc::new(Notify::new());
    let notify = shutdown_started.clone();
    let graceful = async move {
        shutdown_signal(shutdown_timeout).await;
        notify.notify_one();
    };

    serve_with_shutdown(&server_config, || async move {
        let serve = axum::serve(listener, app.into_make_service()).with_graceful_shutdown(graceful);
        let deadline = async {
            shutdown_started.notified().await;
            tokio::time::sleep(shutdown_timeout).await;
        };

        tokio::select! {
            result = serve => result,
            () = deadline => {
                tracing::warn!(
                    target: TRACING_TARGET_SERVER_SHUTDOWN,
                    timeout_secs = shutdown_timeout.as_secs(),
                    "shutdown timeout elapsed with requests still in flight"
                );
                Ok(())
            }
        }
    })
    .await
}
