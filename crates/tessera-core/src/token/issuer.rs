//! Token minting and validation.

use std::sync::Arc;

#[cfg(feature = "config")]
use clap::Args;
use jiff::{SignedDuration, Timestamp};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind as JwtErrorKind};
use jsonwebtoken::{Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Claims, IssuedToken, SessionKeys, Token};
use crate::{Error, Identity, Result};

/// Tracing target for token issuance and validation.
const TRACING_TARGET: &str = "tessera_core::token::issuer";

/// Lifetime and addressing of issued tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct TokenConfig {
    /// Token lifetime in seconds.
    #[cfg_attr(
        feature = "config",
        arg(long = "token-ttl-secs", env = "TOKEN_TTL_SECS", default_value_t = 86400)
    )]
    #[serde(default = "TokenConfig::default_ttl_secs")]
    pub ttl_secs: u64,

    /// Value of the `iss` claim.
    #[cfg_attr(
        feature = "config",
        arg(long = "token-issuer", env = "TOKEN_ISSUER", default_value = "tessera")
    )]
    #[serde(default = "TokenConfig::default_issuer")]
    pub issuer: String,

    /// Value of the `aud` claim.
    #[cfg_attr(
        feature = "config",
        arg(long = "token-audience", env = "TOKEN_AUDIENCE", default_value = "tessera:api")
    )]
    #[serde(default = "TokenConfig::default_audience")]
    pub audience: String,
}

impl TokenConfig {
    /// Longest accepted token lifetime (one year).
    pub const MAX_TTL_SECS: u64 = 365 * 24 * 60 * 60;

    fn default_ttl_secs() -> u64 {
        86400
    }

    fn default_issuer() -> String {
        "tessera".to_owned()
    }

    fn default_audience() -> String {
        "tessera:api".to_owned()
    }

    /// Returns the token lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Config`](crate::ErrorKind::Config) if the lifetime
    /// is zero or longer than [`MAX_TTL_SECS`](Self::MAX_TTL_SECS).
    pub fn ttl(&self) -> Result<SignedDuration> {
        if self.ttl_secs == 0 {
            return Err(Error::config("token ttl must be greater than zero"));
        }

        if self.ttl_secs > Self::MAX_TTL_SECS {
            return Err(Error::config(format!(
                "token ttl must not exceed {} seconds",
                Self::MAX_TTL_SECS
            )));
        }

        let secs = i64::try_from(self.ttl_secs)
            .map_err(|e| Error::config("token ttl is out of range").with_source(e))?;
        Ok(SignedDuration::from_secs(secs))
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Config`](crate::ErrorKind::Config) for an unusable
    /// lifetime or an empty issuer or audience.
    pub fn validate(&self) -> Result<()> {
        self.ttl()?;

        if self.issuer.trim().is_empty() {
            return Err(Error::config("token issuer must not be empty"));
        }

        if self.audience.trim().is_empty() {
            return Err(Error::config("token audience must not be empty"));
        }

        Ok(())
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            ttl_secs: Self::default_ttl_secs(),
            issuer: Self::default_issuer(),
            audience: Self::default_audience(),
        }
    }
}

/// Mints and validates signed session tokens.
///
/// Holds immutable key material and configuration; cheap to clone.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    keys: SessionKeys,
    issuer: Arc<str>,
    audience: Arc<str>,
    ttl: SignedDuration,
    validation: Arc<Validation>,
}

impl TokenIssuer {
    /// Creates a new issuer.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Config`](crate::ErrorKind::Config) if the
    /// configuration is invalid.
    pub fn new(keys: SessionKeys, config: &TokenConfig) -> Result<Self> {
        config.validate()?;

        let mut validation = Validation::new(keys.algorithm());
        // Expiry is checked against the caller-supplied clock.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);

        Ok(Self {
            keys,
            issuer: Arc::from(config.issuer.as_str()),
            audience: Arc::from(config.audience.as_str()),
            ttl: config.ttl()?,
            validation: Arc::new(validation),
        })
    }

    /// Issues a token for the identity, valid from now.
    ///
    /// # Errors
    ///
    /// See [`issue_at`](Self::issue_at).
    pub fn issue(&self, identity: &Identity) -> Result<IssuedToken> {
        self.issue_at(identity, Timestamp::now())
    }

    /// Issues a token for the identity, valid from `now`.
    ///
    /// `now` is truncated to whole seconds so that the returned claims equal
    /// the ones a verifier decodes.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Internal`](crate::ErrorKind::Internal) if the
    /// expiry overflows or signing fails.
    pub fn issue_at(&self, identity: &Identity, now: Timestamp) -> Result<IssuedToken> {
        let issued_at = Timestamp::from_second(now.as_second()).map_err(|e| {
            Error::internal("token issuer", "issue time out of range").with_source(e)
        })?;

        let expires_at = issued_at.checked_add(self.ttl).map_err(|e| {
            Error::internal("token issuer", "expiry time out of range").with_source(e)
        })?;

        let claims = Claims {
            issuer: self.issuer.to_string(),
            audience: self.audience.to_string(),
            token_id: Uuid::new_v4(),
            subject: identity.id,
            issued_at,
            expires_at,
            role: identity.role,
        };

        let header = Header::new(self.keys.algorithm());
        let token = encode(&header, &claims, self.keys.encoding_key()).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %e,
                subject = %claims.subject,
                "failed to encode session token"
            );

            Error::internal("token issuer", "token signing failed").with_source(e)
        })?;

        tracing::debug!(
            target: TRACING_TARGET,
            subject = %claims.subject,
            token_id = %claims.token_id,
            expires_at = %claims.expires_at,
            "session token issued"
        );

        Ok(IssuedToken {
            token: Token::from(token),
            claims,
        })
    }

    /// Validates a token against the current time.
    ///
    /// # Errors
    ///
    /// See [`validate_at`](Self::validate_at).
    pub fn validate(&self, token: &str) -> Result<Claims> {
        self.validate_at(token, Timestamp::now())
    }

    /// Validates a token's structure, signature and expiry at `now`.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::MalformedToken`](crate::ErrorKind::MalformedToken) if the
    ///   token cannot be parsed, uses another algorithm, lacks a claim or names
    ///   a different issuer or audience.
    /// - [`ErrorKind::InvalidSignature`](crate::ErrorKind::InvalidSignature) if
    ///   the signature does not verify.
    /// - [`ErrorKind::ExpiredToken`](crate::ErrorKind::ExpiredToken) if `now` is
    ///   past the expiry.
    pub fn validate_at(&self, token: &str, now: Timestamp) -> Result<Claims> {
        let data = decode::<Claims>(token, self.keys.decoding_key(), &self.validation)
            .map_err(map_jwt_error)?;

        let claims = data.claims;
        if claims.is_expired_at(now) {
            tracing::debug!(
                target: TRACING_TARGET,
                subject = %claims.subject,
                expires_at = %claims.expires_at,
                "session token expired"
            );

            return Err(Error::expired_token());
        }

        Ok(claims)
    }
}

fn map_jwt_error(error: JwtError) -> Error {
    tracing::debug!(
        target: TRACING_TARGET,
        error = %error,
        "session token rejected"
    );

    match error.kind() {
        JwtErrorKind::InvalidSignature => Error::invalid_signature().with_source(error),
        JwtErrorKind::ExpiredSignature => Error::expired_token().with_source(error),
        JwtErrorKind::InvalidIssuer => {
            Error::malformed_token("token issuer is not accepted").with_source(error)
        }
        JwtErrorKind::InvalidAudience => {
            Error::malformed_token("token audience is not accepted").with_source(error)
        }
        JwtErrorKind::MissingRequiredClaim(_) => {
            Error::malformed_token("token is missing a required claim").with_source(error)
        }
        _ => Error::malformed_token("token cannot be parsed").with_source(error),
    }
}
