//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use tessera_server::handler::routes;
//! use tessera_server::service::{ServiceConfig, ServiceState};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServiceConfig::default();
//! let state = ServiceState::from_config(&config).await?;
//! let router: axum::Router = routes().with_state(state);
//! # Ok(())
//! # }
//! ```
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod authentication;
mod error;
pub mod request;
pub mod response;

use axum::Router;
use axum::response::{IntoResponse, Response};

pub use crate::handler::error::{Error, ErrorKind, Result};
pub use crate::handler::response::ErrorResponse;
use crate::service::ServiceState;

/// Prefix shared by every versioned route.
pub const API_PREFIX: &str = "/api/v1";

#[inline]
async fn handler() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns a [`Router`] with all routes nested under [`API_PREFIX`] and a
/// JSON `404` fallback.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .nest(API_PREFIX, authentication::routes())
        .fallback(handler)
}

#[cfg(test)]
mod test {
    use axum::Router;
    use axum_test::TestServer;
    use tessera_core::AuthConfig;
    use tessera_core::credential::PasswordHasherConfig;
    use tessera_core::token::SessionKeysConfig;

    use crate::handler::routes;
    use crate::service::{ServiceConfig, ServiceState};

    /// Returns a [`ServiceConfig`] with cheap hashing and a fixed secret.
    pub fn test_config() -> ServiceConfig {
        ServiceConfig {
            auth: AuthConfig {
                hasher: PasswordHasherConfig::insecure_minimum(),
                session_keys: SessionKeysConfig {
                    secret: Some("tessera-test-secret-0123456789abcdef".to_owned()),
                    ..SessionKeysConfig::default()
                },
                ..AuthConfig::default()
            },
        }
    }

    /// Returns a new [`TestServer`] with the given router.
    pub async fn create_test_server_with_router(
        router: impl Fn(ServiceState) -> Router<ServiceState>,
    ) -> anyhow::Result<TestServer> {
        let state = ServiceState::from_config(&test_config()).await?;
        let router = router(state.clone());
        create_test_server_with_state(router, state)
    }

    /// Returns a new [`TestServer`] with the given router and state.
    pub fn create_test_server_with_state(
        router: Router<ServiceState>,
        state: ServiceState,
    ) -> anyhow::Result<TestServer> {
        let server = TestServer::new(router.with_state(state))?;
        Ok(server)
    }

    /// Returns a new [`TestServer`] with the default router and state.
    pub async fn create_test_server() -> anyhow::Result<TestServer> {
        create_test_server_with_router(|_| routes()).await
    }

    #[tokio::test]
    async fn handlers() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        assert!(server.is_running());
        Ok(())
    }

    #[tokio::test]
    async fn versioned_routes() -> anyhow::Result<()> {
        let server = create_test_server().await?;

        let response = server
            .post("/api/v1/auth/register")
            .json(&serde_json::json!({
                "firstname": "Ada",
                "email": "ada@x.com",
                "password": "s3cret!"
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);

        let response = server.get("/auth/session").await;
        response.assert_status_not_found();
        let body: serde_json::Value = response.json();
        assert_eq!(body["name"], "not_found");
        Ok(())
    }
}
