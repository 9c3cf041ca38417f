//! Registration, authentication and session introspection handlers.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tessera_core::AuthService;

use crate::extract::{AuthClaims, Json, ValidateJson};
use crate::handler::Result;
use crate::handler::request::{Authenticate, Register};
use crate::handler::response::{AuthToken, Registered, Session};
use crate::service::ServiceState;

/// Tracing target for authentication handlers.
const TRACING_TARGET: &str = "tessera_server::handler::authentication";

/// Registers a new identity and returns it with its first session token.
#[tracing::instrument(skip_all)]
async fn register(
    State(auth_service): State<AuthService>,
    ValidateJson(request): ValidateJson<Register>,
) -> Result<(StatusCode, Json<Registered>)> {
    tracing::trace!(target: TRACING_TARGET, email = %request.email, "registration attempt");

    let outcome = auth_service.register(request.into_registration()).await?;

    tracing::info!(
        target: TRACING_TARGET,
        identity_id = %outcome.identity.id,
        token_id = %outcome.token.claims.token_id,
        "identity registered"
    );

    Ok((StatusCode::CREATED, Json(outcome.into())))
}

/// Exchanges an email and password for a session token.
#[tracing::instrument(skip_all)]
async fn authenticate(
    State(auth_service): State<AuthService>,
    ValidateJson(request): ValidateJson<Authenticate>,
) -> Result<(StatusCode, Json<AuthToken>)> {
    tracing::trace!(target: TRACING_TARGET, "authentication attempt");

    let outcome = auth_service.authenticate(request.into_credentials()).await?;

    tracing::info!(
        target: TRACING_TARGET,
        identity_id = %outcome.identity.id,
        token_id = %outcome.token.claims.token_id,
        "identity authenticated"
    );

    Ok((StatusCode::OK, Json(outcome.token.into())))
}

/// Returns the claims of the presented bearer token.
#[tracing::instrument(skip_all)]
async fn session(AuthClaims(claims): AuthClaims) -> Result<(StatusCode, Json<Session>)> {
    Ok((StatusCode::OK, Json(claims.into())))
}

/// Returns a [`Router`] with all authentication routes.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/authenticate", post(authenticate))
        .route("/auth/session", get(session))
}
