use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Role;

/// Claims carried by a session token.
///
/// Timestamps are encoded as integer seconds since the Unix epoch, as
/// RFC 7519 requires for `iat` and `exp`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Claims {
    // Standard (or registered) claims.
    /// Issuer (who created the token).
    #[serde(rename = "iss")]
    pub issuer: String,
    /// Audience (who the token is intended for).
    #[serde(rename = "aud")]
    pub audience: String,
    /// Unique token identifier.
    #[serde(rename = "jti")]
    pub token_id: Uuid,
    /// Identifier of the identity the token was issued for.
    #[serde(rename = "sub")]
    pub subject: Uuid,
    /// Issued at, whole seconds.
    #[serde(rename = "iat", with = "jiff::fmt::serde::timestamp::second::required")]
    pub issued_at: Timestamp,
    /// Expiration time, whole seconds.
    #[serde(rename = "exp", with = "jiff::fmt::serde::timestamp::second::required")]
    pub expires_at: Timestamp,

    // Private claims.
    /// Role of the identity at issuance time.
    pub role: Role,
}

impl Claims {
    /// Returns `true` if the token is no longer valid at `now`.
    ///
    /// The expiry instant itself is still inside the validity window.
    #[inline]
    #[must_use]
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        now > self.expires_at
    }
}

/// Compact JWS serialization of signed [`Claims`].
///
/// `Debug` only shows that a token is present; the value is a bearer credential.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    /// Returns the token as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the token and returns the inner string.
    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for Token {
    #[inline]
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for Token {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}

/// A freshly signed token together with the claims it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: Token,
    pub claims: Claims,
}
