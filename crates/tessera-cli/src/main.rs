#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::process;

use anyhow::Context;
use axum::Router;
use tessera_server::handler::routes;
use tessera_server::middleware::{RouterObservabilityExt, RouterRecoveryExt};
use tessera_server::service::{ServiceConfig, ServiceState};

use crate::config::{Cli, MiddlewareConfig};
use crate::server::ServerError;

// Tracing target constants
pub const TRACING_TARGET_SERVER_STARTUP: &str = "tessera_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "tessera_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "tessera_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        let server_error = error.downcast_ref::<ServerError>();
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = format!("{error:#}"),
            error_code = server_error.map(ServerError::error_code),
            suggestion = server_error.and_then(ServerError::suggestion),
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    cli.init_tracing();
    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        version = env!("CARGO_PKG_VERSION"),
        "starting tessera server"
    );

    cli.log();
    cli.validate()?;

    let state = create_service_state(&cli.service).await?;
    let router = create_router(state, &cli.middleware);

    server::serve_http(router, cli.server).await?;

    Ok(())
}

/// Loads the signing keys and builds the service state.
async fn create_service_state(config: &ServiceConfig) -> anyhow::Result<ServiceState> {
    ServiceState::from_config(config)
        .await
        .context("failed to create service state")
}

/// Creates the router with all middleware layers applied.
///
/// Layers added last run first:
/// 1. Recovery (outermost): panics and timeouts
/// 2. Observability: request ids and tracing spans
/// 3. Routes (innermost)
fn create_router(state: ServiceState, middleware: &MiddlewareConfig) -> Router {
    routes()
        .with_state(state)
        .with_observability()
        .with_recovery(&middleware.recovery)
}
