//! Conversion from credential service errors to HTTP errors.

use tessera_core::ErrorKind as CoreErrorKind;

use super::http_error::{Error as HttpError, ErrorKind};

/// Tracing target for core error conversions.
const TRACING_TARGET: &str = "tessera_server::handler::core";

impl From<tessera_core::Error> for HttpError<'static> {
    fn from(error: tessera_core::Error) -> Self {
        match error.kind() {
            CoreErrorKind::Validation | CoreErrorKind::InvalidInput => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    error = %error,
                    "rejected invalid input"
                );

                ErrorKind::BadRequest
                    .with_message("Invalid registration data")
                    .with_context(error.message().to_owned())
                    .with_resource("identity")
            }
            CoreErrorKind::DuplicateEmail => ErrorKind::Conflict
                .with_message("Email address is already registered")
                .with_resource("identity"),
            CoreErrorKind::Authentication => ErrorKind::Unauthorized
                .with_message("Invalid email or password")
                .with_resource("authentication"),
            CoreErrorKind::MalformedToken => ErrorKind::MalformedAuthToken
                .with_message("Invalid session token")
                .with_resource("authentication"),
            CoreErrorKind::InvalidSignature => ErrorKind::Unauthorized
                .with_message("Session token signature does not verify")
                .with_resource("authentication"),
            CoreErrorKind::ExpiredToken => ErrorKind::Unauthorized
                .with_message("Session token has expired")
                .with_resource("authentication"),
            CoreErrorKind::CorruptHash
            | CoreErrorKind::Config
            | CoreErrorKind::Store
            | CoreErrorKind::Internal => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %error,
                    error_kind = %error.kind(),
                    "credential service failure"
                );

                ErrorKind::InternalServerError.into_error()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;

    #[test]
    fn maps_core_errors_to_status_codes() {
        let cases = [
            (tessera_core::Error::validation("email"), StatusCode::BAD_REQUEST),
            (tessera_core::Error::invalid_input("empty"), StatusCode::BAD_REQUEST),
            (tessera_core::Error::duplicate_email(), StatusCode::CONFLICT),
            (tessera_core::Error::authentication(), StatusCode::UNAUTHORIZED),
            (tessera_core::Error::malformed_token("garbage"), StatusCode::UNAUTHORIZED),
            (tessera_core::Error::invalid_signature(), StatusCode::UNAUTHORIZED),
            (tessera_core::Error::expired_token(), StatusCode::UNAUTHORIZED),
            (tessera_core::Error::corrupt_hash("truncated"), StatusCode::INTERNAL_SERVER_ERROR),
            (tessera_core::Error::store("unavailable"), StatusCode::INTERNAL_SERVER_ERROR),
            (tessera_core::Error::internal("issuer", "failed"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, status) in cases {
            assert_eq!(HttpError::from(error).kind().status_code(), status);
        }
    }

    #[test]
    fn malformed_token_has_its_own_name() {
        let error = HttpError::from(tessera_core::Error::malformed_token("garbage"));
        assert_eq!(error.kind(), ErrorKind::MalformedAuthToken);
        assert_eq!(error.kind().to_string(), "malformed_auth_token");
    }

    #[test]
    fn internal_failures_do_not_leak_details() {
        let error = HttpError::from(tessera_core::Error::corrupt_hash("stored hash is truncated"));
        assert!(error.context().is_none());
        assert!(error.message().is_none());
    }
}
