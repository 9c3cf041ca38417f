//! Core error types and utilities.
//!
//! Every fallible operation in this crate returns [`Error`], a struct carrying an
//! [`ErrorKind`] for matching, a human-readable message and an optional source.
//! The kinds mirror the failure taxonomy of the credential issuance flows:
//! input problems, registration conflicts, generic credential rejection and
//! integrity failures of hashes and tokens.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

/// Type alias for boxed errors that are Send + Sync.
pub type BoxedError = Box<dyn StdError + Send + Sync>;

/// Result type alias for core operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error kind enumeration for categorizing core errors.
///
/// Separated from [`Error`] so callers can match on the category without
/// touching the message or the source chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed registration or login input.
    Validation,
    /// Registration conflict on an already registered email.
    DuplicateEmail,
    /// Generic invalid-credentials signal.
    ///
    /// Intentionally the same for unknown accounts and wrong passwords.
    Authentication,
    /// Empty or otherwise unusable plaintext handed to the hasher.
    InvalidInput,
    /// Stored password hash is truncated or unparseable.
    CorruptHash,
    /// Token structure or claims cannot be parsed.
    MalformedToken,
    /// Token signature does not verify.
    InvalidSignature,
    /// Token is past its expiry.
    ExpiredToken,
    /// Configuration-related errors.
    Config,
    /// User store failures other than uniqueness conflicts.
    Store,
    /// Internal logic errors.
    Internal,
}

impl ErrorKind {
    /// Returns the error kind as a string for categorization.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::DuplicateEmail => "duplicate_email",
            Self::Authentication => "authentication",
            Self::InvalidInput => "invalid_input",
            Self::CorruptHash => "corrupt_hash",
            Self::MalformedToken => "malformed_token",
            Self::InvalidSignature => "invalid_signature",
            Self::ExpiredToken => "expired_token",
            Self::Config => "config",
            Self::Store => "store",
            Self::Internal => "internal",
        }
    }

    /// Returns `true` for hash and token integrity failures.
    #[must_use]
    pub const fn is_integrity_failure(self) -> bool {
        matches!(
            self,
            Self::CorruptHash | Self::MalformedToken | Self::InvalidSignature | Self::ExpiredToken
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core error with structured information.
#[derive(Debug, thiserror::Error)]
#[error("{kind} error: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: Cow<'static, str>,
    #[source]
    source: Option<BoxedError>,
}

impl Error {
    /// Creates a new [`Error`].
    #[inline]
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Attaches a source error to this error.
    #[inline]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error kind.
    #[must_use]
    #[inline]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error message.
    #[must_use]
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Creates a new validation error.
    #[inline]
    pub fn validation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Creates a new duplicate email error.
    #[inline]
    pub fn duplicate_email() -> Self {
        Self::new(ErrorKind::DuplicateEmail, "email address is already registered")
    }

    /// Creates the generic invalid credentials error.
    ///
    /// The message is fixed so that the unknown-account and wrong-password
    /// paths produce byte-identical errors.
    #[inline]
    pub fn authentication() -> Self {
        Self::new(ErrorKind::Authentication, "invalid email or password")
    }

    /// Creates a new invalid input error.
    #[inline]
    pub fn invalid_input(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }

    /// Creates a new corrupt hash error.
    #[inline]
    pub fn corrupt_hash(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::CorruptHash, message)
    }

    /// Creates a new malformed token error.
    #[inline]
    pub fn malformed_token(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::MalformedToken, message)
    }

    /// Creates a new invalid signature error.
    #[inline]
    pub fn invalid_signature() -> Self {
        Self::new(ErrorKind::InvalidSignature, "token signature does not verify")
    }

    /// Creates a new expired token error.
    #[inline]
    pub fn expired_token() -> Self {
        Self::new(ErrorKind::ExpiredToken, "token has expired")
    }

    /// Creates a new configuration error.
    #[inline]
    pub fn config(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    /// Creates a new user store error.
    #[inline]
    pub fn store(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Store, message)
    }

    /// Creates a new internal error.
    #[inline]
    pub fn internal(
        component: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        let component = component.into();
        let message = message.into();
        Self::new(ErrorKind::Internal, format!("{component}: {message}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_creation() {
        let error = Error::config("invalid configuration");
        assert_eq!(error.kind(), ErrorKind::Config);
        assert_eq!(error.message(), "invalid configuration");
    }

    #[test]
    fn error_with_source() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = Error::config("cannot read key file").with_source(source);

        assert!(StdError::source(&error).is_some());
        assert_eq!(error.kind(), ErrorKind::Config);
    }

    #[test]
    fn internal_error_names_component() {
        let error = Error::internal("hasher", "worker pool closed");

        assert_eq!(error.kind(), ErrorKind::Internal);
        assert!(error.to_string().contains("hasher"));
        assert!(error.to_string().contains("worker pool closed"));
    }

    #[test]
    fn authentication_errors_are_indistinguishable() {
        let a = Error::authentication();
        let b = Error::authentication();

        assert_eq!(a.kind(), b.kind());
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn integrity_failures() {
        assert!(ErrorKind::CorruptHash.is_integrity_failure());
        assert!(ErrorKind::ExpiredToken.is_integrity_failure());
        assert!(!ErrorKind::Authentication.is_integrity_failure());
        assert!(!ErrorKind::Validation.is_integrity_failure());
    }
}
