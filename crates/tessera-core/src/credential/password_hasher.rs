//! Secure password hashing and verification using Argon2id.
//!
//! Hashes are produced in the PHC string format, which embeds the algorithm,
//! its parameters and the salt, so verification needs nothing but the stored
//! string. Hashing is deliberately slow; callers on an async executor must
//! run these methods on a blocking thread.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{Error as ArgonError, SaltString};
use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier, Version,
};
#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Tracing target for password hashing and verification.
const TRACING_TARGET: &str = "tessera_core::credential::hasher";

/// Argon2id work factor and hashing pool configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct PasswordHasherConfig {
    /// Memory cost in KiB.
    #[cfg_attr(
        feature = "config",
        arg(long = "hash-memory-cost", env = "HASH_MEMORY_COST", default_value_t = 19456)
    )]
    pub memory_cost_kib: u32,

    /// Number of Argon2 passes.
    #[cfg_attr(
        feature = "config",
        arg(long = "hash-time-cost", env = "HASH_TIME_COST", default_value_t = 2)
    )]
    pub time_cost: u32,

    /// Degree of parallelism (lanes).
    #[cfg_attr(
        feature = "config",
        arg(long = "hash-parallelism", env = "HASH_PARALLELISM", default_value_t = 1)
    )]
    pub parallelism: u32,

    /// Maximum number of hash or verify operations running at the same time.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "hash-max-concurrency",
            env = "HASH_MAX_CONCURRENCY",
            default_value_t = 4
        )
    )]
    pub max_concurrency: usize,
}

impl PasswordHasherConfig {
    /// Cheapest parameters Argon2 accepts. Only meant for tests.
    pub const fn insecure_minimum() -> Self {
        Self {
            memory_cost_kib: Params::MIN_M_COST,
            time_cost: Params::MIN_T_COST,
            parallelism: Params::MIN_P_COST,
            max_concurrency: 4,
        }
    }
}

impl Default for PasswordHasherConfig {
    /// OWASP recommended parameters: 19 MiB, 2 iterations, 1 lane.
    fn default() -> Self {
        Self {
            memory_cost_kib: 19456,
            time_cost: 2,
            parallelism: 1,
            max_concurrency: 4,
        }
    }
}

/// Secure password hashing and verification service using Argon2id.
///
/// Cheap to clone; clones share nothing mutable.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    dummy_hash: String,
    max_concurrency: usize,
}

impl PasswordHasher {
    /// Creates a new hasher from the given work factor configuration.
    ///
    /// Computes one throwaway hash up front, used by
    /// [`verify_dummy_password`](Self::verify_dummy_password).
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Config`](crate::ErrorKind::Config) if Argon2 rejects
    /// the parameters or the pool size is zero.
    pub fn new(config: &PasswordHasherConfig) -> Result<Self> {
        if config.max_concurrency == 0 {
            return Err(Error::config("hash max concurrency must be at least 1"));
        }

        let params = Params::new(
            config.memory_cost_kib,
            config.time_cost,
            config.parallelism,
            None,
        )
        .map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %e,
                "failed to create argon2 parameters"
            );

            Error::config("invalid password hashing configuration").with_source(e)
        })?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let mut hasher = Self {
            argon2,
            dummy_hash: String::new(),
            max_concurrency: config.max_concurrency,
        };

        hasher.dummy_hash = hasher.hash_password(&random_password())?;

        tracing::debug!(
            target: TRACING_TARGET,
            memory_cost_kib = config.memory_cost_kib,
            time_cost = config.time_cost,
            parallelism = config.parallelism,
            max_concurrency = config.max_concurrency,
            "password hasher initialized"
        );

        Ok(hasher)
    }

    /// Returns how many hash operations may run concurrently.
    #[inline]
    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Hashes a password using Argon2id with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidInput`](crate::ErrorKind::InvalidInput) for an
    /// empty password and [`ErrorKind::Internal`](crate::ErrorKind::Internal) if
    /// the hashing primitive fails.
    pub fn hash_password(&self, password: &str) -> Result<String> {
        if password.is_empty() {
            return Err(Error::invalid_input("password must not be empty"));
        }

        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %e,
                    "password hashing operation failed"
                );

                Error::internal("password hasher", "hash generation failed").with_source(e)
            })?;

        Ok(password_hash.to_string())
    }

    /// Verifies a password against a stored PHC hash in constant time.
    ///
    /// Returns `Ok(false)` for a wrong password.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::CorruptHash`](crate::ErrorKind::CorruptHash) if the
    /// stored hash cannot be parsed, lacks a hash value, or names parameters
    /// Argon2 cannot use.
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(stored_hash).map_err(|e| {
            tracing::warn!(
                target: TRACING_TARGET,
                error = %e,
                "invalid password hash format"
            );

            Error::corrupt_hash("stored password hash is unparseable").with_source(e)
        })?;

        if parsed_hash.hash.is_none() || parsed_hash.salt.is_none() {
            tracing::warn!(
                target: TRACING_TARGET,
                "stored password hash is missing its salt or hash value"
            );

            return Err(Error::corrupt_hash("stored password hash is truncated"));
        }

        match self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
        {
            Ok(()) => {
                tracing::debug!(target: TRACING_TARGET, "password verification succeeded");
                Ok(true)
            }
            Err(ArgonError::Password) => {
                tracing::debug!(target: TRACING_TARGET, "password verification failed");
                Ok(false)
            }
            Err(e) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %e,
                    "stored password hash cannot be verified"
                );

                Err(Error::corrupt_hash("stored password hash cannot be verified").with_source(e))
            }
        }
    }

    /// Performs a verification against a throwaway hash and always returns `false`.
    ///
    /// Used when no account matches, so that the unknown-account path costs the
    /// same as a wrong password on an existing account.
    pub fn verify_dummy_password(&self, password: &str) -> bool {
        let _ = self.verify_password(password, &self.dummy_hash);
        false
    }
}

/// Generates a random alphanumeric password of 16 to 31 characters.
fn random_password() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let len = rng.random_range(16..32);
    (0..len)
        .map(|_| rng.sample(rand::distr::Alphanumeric) as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn hasher() -> anyhow::Result<PasswordHasher> {
        Ok(PasswordHasher::new(&PasswordHasherConfig::insecure_minimum())?)
    }

    #[test]
    fn hash_and_verify_password() -> anyhow::Result<()> {
        let hasher = hasher()?;
        let hash = hasher.hash_password("secure_password_123")?;

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify_password("secure_password_123", &hash)?);
        assert!(!hasher.verify_password("wrong_password", &hash)?);

        Ok(())
    }

    #[test]
    fn hash_produces_unique_salts() -> anyhow::Result<()> {
        let hasher = hasher()?;

        let hash1 = hasher.hash_password("test_password")?;
        let hash2 = hasher.hash_password("test_password")?;

        assert_ne!(hash1, hash2);
        assert!(hasher.verify_password("test_password", &hash1)?);
        assert!(hasher.verify_password("test_password", &hash2)?);

        Ok(())
    }

    #[test]
    fn hash_rejects_empty_password() -> anyhow::Result<()> {
        let error = hasher()?.hash_password("").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidInput);
        Ok(())
    }

    #[test]
    fn verify_rejects_unparseable_hash() -> anyhow::Result<()> {
        let error = hasher()?
            .verify_password("test_password", "not_a_valid_hash_format")
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::CorruptHash);
        Ok(())
    }

    #[test]
    fn verify_rejects_truncated_hash() -> anyhow::Result<()> {
        let hasher = hasher()?;
        let hash = hasher.hash_password("test_password")?;
        let truncated = &hash[..hash.rfind('$').unwrap_or(0)];

        let error = hasher
            .verify_password("test_password", truncated)
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::CorruptHash);
        Ok(())
    }

    #[test]
    fn hash_from_other_parameters_still_verifies() -> anyhow::Result<()> {
        let cheap = hasher()?;
        let other = PasswordHasher::new(&PasswordHasherConfig {
            memory_cost_kib: 16,
            time_cost: 2,
            ..PasswordHasherConfig::insecure_minimum()
        })?;

        let hash = other.hash_password("test_password")?;
        assert!(cheap.verify_password("test_password", &hash)?);
        Ok(())
    }

    #[test]
    fn dummy_verification_always_fails() -> anyhow::Result<()> {
        let hasher = hasher()?;
        assert!(!hasher.verify_dummy_password("anything"));
        assert!(!hasher.verify_dummy_password(""));
        Ok(())
    }

    #[test]
    fn reject_invalid_configuration() {
        let zero_pool = PasswordHasherConfig {
            max_concurrency: 0,
            ..PasswordHasherConfig::insecure_minimum()
        };
        let zero_lanes = PasswordHasherConfig {
            parallelism: 0,
            ..PasswordHasherConfig::insecure_minimum()
        };

        for config in [zero_pool, zero_lanes] {
            let error = PasswordHasher::new(&config).unwrap_err();
            assert_eq!(error.kind(), ErrorKind::Config);
        }
    }
}
