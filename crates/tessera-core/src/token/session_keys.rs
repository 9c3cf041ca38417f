//! Signing material for session tokens.
//!
//! Keys are loaded once at startup and shared read-only for the lifetime of
//! the process. Two algorithms are supported: `HS256` with a shared secret and
//! `EdDSA` with an Ed25519 key pair stored as PEM files.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[cfg(feature = "config")]
use clap::Args;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Tracing target for session key loading.
const TRACING_TARGET: &str = "tessera_core::token::session_keys";

/// Where the signing material comes from.
///
/// Either `secret` or both PEM paths must be set; the secret wins when both are.
#[derive(Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct SessionKeysConfig {
    /// Shared HS256 secret, at least 32 bytes.
    #[cfg_attr(
        feature = "config",
        arg(long = "session-secret", env = "SESSION_SECRET", hide_env_values = true)
    )]
    pub secret: Option<String>,

    /// File path to the Ed25519 public key (PEM) used to verify tokens.
    #[cfg_attr(
        feature = "config",
        arg(long = "session-public-key", env = "SESSION_PUBLIC_PEM_FILEPATH")
    )]
    pub decoding_key: Option<PathBuf>,

    /// File path to the Ed25519 private key (PEM) used to sign tokens.
    #[cfg_attr(
        feature = "config",
        arg(long = "session-private-key", env = "SESSION_PRIVATE_PEM_FILEPATH")
    )]
    pub encoding_key: Option<PathBuf>,
}

impl fmt::Debug for SessionKeysConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKeysConfig")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("decoding_key", &self.decoding_key)
            .field("encoding_key", &self.encoding_key)
            .finish()
    }
}

/// Keys used to sign and verify session tokens.
///
/// Cheap to clone; clones share the same key material.
#[derive(Clone)]
pub struct SessionKeys {
    inner: Arc<SessionKeysInner>,
}

struct SessionKeysInner {
    algorithm: Algorithm,
    decoding_key: DecodingKey,
    encoding_key: EncodingKey,
}

impl SessionKeys {
    /// Minimum accepted length of an HS256 secret, in bytes.
    pub const MIN_SECRET_LEN: usize = 32;

    /// Loads the keys described by the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Config`](crate::ErrorKind::Config) if neither a
    /// secret nor a complete PEM pair is configured, or if the material is
    /// unreadable or invalid.
    pub async fn from_config(config: &SessionKeysConfig) -> Result<Self> {
        if let Some(secret) = &config.secret {
            return Self::from_secret(secret.as_bytes());
        }

        match (&config.decoding_key, &config.encoding_key) {
            (Some(decoding_key), Some(encoding_key)) => {
                Self::from_pem_files(decoding_key, encoding_key).await
            }
            _ => Err(Error::config(
                "either a session secret or both session key files must be configured",
            )),
        }
    }

    /// Creates `HS256` keys from a shared secret.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Config`](crate::ErrorKind::Config) if the secret is
    /// shorter than [`MIN_SECRET_LEN`](Self::MIN_SECRET_LEN).
    pub fn from_secret(secret: &[u8]) -> Result<Self> {
        if secret.len() < Self::MIN_SECRET_LEN {
            return Err(Error::config(format!(
                "session secret must be at least {} bytes",
                Self::MIN_SECRET_LEN
            )));
        }

        tracing::info!(
            target: TRACING_TARGET,
            algorithm = "HS256",
            "session keys loaded"
        );

        Ok(Self::with_keys(
            Algorithm::HS256,
            DecodingKey::from_secret(secret),
            EncodingKey::from_secret(secret),
        ))
    }

    /// Creates `EdDSA` keys from PEM-encoded Ed25519 key material.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Config`](crate::ErrorKind::Config) if either PEM
    /// block cannot be parsed.
    pub fn from_ed_pem(public_pem: &[u8], private_pem: &[u8]) -> Result<Self> {
        let decoding_key = DecodingKey::from_ed_pem(public_pem).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %e,
                "failed to parse decoding key PEM data"
            );

            Error::config("invalid decoding key PEM format").with_source(e)
        })?;

        let encoding_key = EncodingKey::from_ed_pem(private_pem).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %e,
                "failed to parse encoding key PEM data"
            );

            Error::config("invalid encoding key PEM format").with_source(e)
        })?;

        Ok(Self::with_keys(Algorithm::EdDSA, decoding_key, encoding_key))
    }

    /// Reads an Ed25519 key pair from PEM files.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Config`](crate::ErrorKind::Config) if a file cannot
    /// be read or does not hold a valid key.
    pub async fn from_pem_files(
        decoding_pem_key: impl AsRef<Path>,
        encoding_pem_key: impl AsRef<Path>,
    ) -> Result<Self> {
        let public_pem = read_pem(decoding_pem_key.as_ref(), "decoding").await?;
        let private_pem = read_pem(encoding_pem_key.as_ref(), "encoding").await?;

        let keys = Self::from_ed_pem(&public_pem, &private_pem)?;

        tracing::info!(
            target: TRACING_TARGET,
            algorithm = "EdDSA",
            "session keys loaded"
        );

        Ok(keys)
    }

    fn with_keys(algorithm: Algorithm, decoding_key: DecodingKey, encoding_key: EncodingKey) -> Self {
        let inner = SessionKeysInner {
            algorithm,
            decoding_key,
            encoding_key,
        };

        Self {
            inner: Arc::new(inner),
        }
    }

    /// Returns the signing algorithm.
    #[inline]
    pub fn algorithm(&self) -> Algorithm {
        self.inner.algorithm
    }

    /// Returns a reference to the key used to verify tokens.
    #[inline]
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.inner.decoding_key
    }

    /// Returns a reference to the key used to sign tokens.
    #[inline]
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.inner.encoding_key
    }

    /// Signs and verifies a throwaway token to prove the keys belong together.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Config`](crate::ErrorKind::Config) if either step
    /// fails.
    pub fn validate_keys(&self) -> Result<()> {
        #[derive(Serialize, Deserialize)]
        struct ProbeClaims {
            sub: String,
            exp: i64,
        }

        let claims = ProbeClaims {
            sub: "probe".to_owned(),
            exp: jiff::Timestamp::now().as_second() + 300,
        };

        let token = encode(&Header::new(self.algorithm()), &claims, self.encoding_key())
            .map_err(|e| {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %e,
                    "key validation failed during encoding"
                );

                Error::config("key validation encoding failed").with_source(e)
            })?;

        let mut validation = Validation::new(self.algorithm());
        validation.set_required_spec_claims(&["exp", "sub"]);

        decode::<ProbeClaims>(&token, self.decoding_key(), &validation).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %e,
                "key validation failed during decoding"
            );

            Error::config("key validation decoding failed").with_source(e)
        })?;

        tracing::debug!(target: TRACING_TARGET, "key validation successful");
        Ok(())
    }
}

impl fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKeys")
            .field("algorithm", &self.inner.algorithm)
            .finish_non_exhaustive()
    }
}

async fn read_pem(path: &Path, role: &'static str) -> Result<Vec<u8>> {
    tracing::debug!(
        target: TRACING_TARGET,
        path = %path.display(),
        role,
        "loading key from file"
    );

    tokio::fs::read(path).await.map_err(|e| {
        tracing::error!(
            target: TRACING_TARGET,
            path = %path.display(),
            role,
            error = %e,
            "failed to read key file"
        );

        Error::config(format!("failed to read {role} key file")).with_source(e)
    })
}
