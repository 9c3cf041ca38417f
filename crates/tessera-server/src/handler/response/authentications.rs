//! Authentication response types.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use tessera_core::service::RegisterOutcome;
use tessera_core::token::{Claims, IssuedToken};
use tessera_core::{IdentityView, Role};
use uuid::Uuid;

/// Response returned after successful registration or authentication.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthToken {
    /// Signed session token.
    pub token: String,
}

impl From<IssuedToken> for AuthToken {
    fn from(issued: IssuedToken) -> Self {
        Self {
            token: issued.token.into_inner(),
        }
    }
}

/// Response returned after successful registration.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registered {
    /// Signed session token.
    pub token: String,
    /// The new identity, without credential material.
    pub identity: IdentityView,
}

impl From<RegisterOutcome> for Registered {
    fn from(outcome: RegisterOutcome) -> Self {
        Self {
            token: outcome.token.token.into_inner(),
            identity: outcome.identity.view(),
        }
    }
}

/// Claims of the session token presented with the request.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Identifier of the authenticated identity.
    pub subject: Uuid,
    /// Role carried by the token.
    pub role: Role,
    /// Timestamp when the token was issued.
    pub issued_at: Timestamp,
    /// Timestamp when the token expires.
    pub expires_at: Timestamp,
}

impl From<Claims> for Session {
    fn from(claims: Claims) -> Self {
        Self {
            subject: claims.subject,
            role: claims.role,
            issued_at: claims.issued_at,
            expires_at: claims.expires_at,
        }
    }
}
