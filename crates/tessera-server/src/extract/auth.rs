//! Session token extraction from the `Authorization` header.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use axum_extra::typed_header::TypedHeaderRejectionReason;
use derive_more::Deref;
use tessera_core::AuthService;
use tessera_core::token::Claims;

use crate::TRACING_TARGET_AUTHENTICATION;
use crate::handler::{Error, ErrorKind};

/// Validated claims of the bearer token presented with the request.
///
/// Rejects with `401` when the header is missing, the token is malformed,
/// its signature does not verify, or it has expired. The claims are cached in
/// the request extensions, so extracting twice validates once.
///
/// ```rust,ignore
/// async fn handler(AuthClaims(claims): AuthClaims) -> String {
///     claims.subject.to_string()
/// }
/// ```
#[must_use]
#[derive(Debug, Clone, Deref)]
pub struct AuthClaims(pub Claims);

impl AuthClaims {
    /// Returns the inner claims.
    #[inline]
    pub fn into_inner(self) -> Claims {
        self.0
    }
}

impl<S> FromRequestParts<S> for AuthClaims
where
    S: Send + Sync,
    AuthService: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(auth_claims) = parts.extensions.get::<Self>() {
            return Ok(auth_claims.clone());
        }

        type AuthBearerHeader = TypedHeader<Authorization<Bearer>>;
        let TypedHeader(authorization) = AuthBearerHeader::from_request_parts(parts, state)
            .await
            .map_err(|rejection| match rejection.reason() {
                TypedHeaderRejectionReason::Missing => ErrorKind::MissingAuthToken
                    .with_message("Authentication required")
                    .with_context("Missing Authorization header with Bearer token")
                    .with_resource("authentication"),
                _ => ErrorKind::MalformedAuthToken
                    .with_message("Invalid token format")
                    .with_context("Authorization header must contain a valid Bearer token")
                    .with_resource("authentication"),
            })?;

        let auth_service = AuthService::from_ref(state);
        let claims = auth_service.validate(authorization.token()).map_err(|e| {
            tracing::debug!(
                target: TRACING_TARGET_AUTHENTICATION,
                error = %e,
                "session token rejected"
            );

            Error::from(e)
        })?;

        tracing::trace!(
            target: TRACING_TARGET_AUTHENTICATION,
            subject = %claims.subject,
            token_id = %claims.token_id,
            "session token accepted"
        );

        let auth_claims = Self(claims);
        parts.extensions.insert(auth_claims.clone());
        Ok(auth_claims)
    }
}
