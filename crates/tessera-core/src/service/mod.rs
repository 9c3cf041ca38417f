//! Registration and authentication flows.
//!
//! [`AuthService`] composes the [`PasswordHasher`], the [`TokenIssuer`] and a
//! [`UserStore`] into the two credential issuance flows:
//!
//! - `register`: validate, hash, issue, save atomically
//! - `authenticate`: single lookup, verify (or dummy-verify), issue
//!
//! Both flows either complete fully or abort without side effects; a token is
//! only issued for an identity that was persisted or verified.

mod config;

use std::fmt;
use std::sync::Arc;

use jiff::Timestamp;
use tokio::sync::Semaphore;

pub use self::config::AuthConfig;
use crate::credential::{
    CredentialStrategy, Credentials, PasswordHasher, Registration, normalize_email,
};
use crate::store::UserStore;
use crate::token::{Claims, IssuedToken, SessionKeys, TokenIssuer};
use crate::{Error, Identity, Result, Role};

/// Tracing target for the credential issuance flows.
const TRACING_TARGET: &str = "tessera_core::service";

/// Result of a successful registration.
#[derive(Debug, Clone)]
pub struct RegisterOutcome {
    /// The newly persisted identity.
    pub identity: Identity,
    /// Token issued for it.
    pub token: IssuedToken,
}

/// Result of a successful authentication.
#[derive(Debug, Clone)]
pub struct AuthenticateOutcome {
    /// The identity the credentials belong to.
    pub identity: Identity,
    /// Token issued for it.
    pub token: IssuedToken,
}

/// Credential issuance service.
///
/// Cheap to clone and safe to share across tasks. Password hashing runs on the
/// blocking thread pool, bounded by the hasher's
/// [`max_concurrency`](PasswordHasher::max_concurrency).
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    hasher: Arc<PasswordHasher>,
    issuer: TokenIssuer,
    strategy: CredentialStrategy,
    hashing_permits: Arc<Semaphore>,
}

impl AuthService {
    /// Creates a new service from already constructed components.
    pub fn new(store: Arc<dyn UserStore>, hasher: PasswordHasher, issuer: TokenIssuer) -> Self {
        let hashing_permits = Arc::new(Semaphore::new(hasher.max_concurrency()));

        Self {
            store,
            hasher: Arc::new(hasher),
            issuer,
            strategy: CredentialStrategy::default(),
            hashing_permits,
        }
    }

    /// Builds every component from configuration.
    ///
    /// Loads the signing keys and proves them with a sign/verify round trip
    /// before returning.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Config`](crate::ErrorKind::Config) for any invalid
    /// or unusable setting.
    pub async fn from_config(config: &AuthConfig, store: Arc<dyn UserStore>) -> Result<Self> {
        let hasher_config = config.hasher.clone();
        let hasher = tokio::task::spawn_blocking(move || PasswordHasher::new(&hasher_config))
            .await
            .map_err(|e| Error::internal("auth service", "hasher setup panicked").with_source(e))??;

        let keys = SessionKeys::from_config(&config.session_keys).await?;
        keys.validate_keys()?;

        let issuer = TokenIssuer::new(keys, &config.token)?;

        tracing::info!(
            target: TRACING_TARGET,
            token_ttl_secs = config.token.ttl_secs,
            hash_max_concurrency = config.hasher.max_concurrency,
            "auth service initialized"
        );

        Ok(Self::new(store, hasher, issuer))
    }

    /// Registers a new identity and issues a token for it.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::Validation`](crate::ErrorKind::Validation) for malformed input.
    /// - [`ErrorKind::DuplicateEmail`](crate::ErrorKind::DuplicateEmail) if the
    ///   email is taken; nothing is persisted.
    pub async fn register(&self, registration: Registration) -> Result<RegisterOutcome> {
        self.register_at(registration, Timestamp::now()).await
    }

    /// Registers a new identity created at `now`.
    ///
    /// The token is signed before the identity is saved, so a signing failure
    /// leaves the store untouched.
    ///
    /// # Errors
    ///
    /// See [`register`](Self::register) and [`TokenIssuer::issue_at`].
    pub async fn register_at(
        &self,
        registration: Registration,
        now: Timestamp,
    ) -> Result<RegisterOutcome> {
        let registration = Registration {
            display_name: registration.display_name.trim().to_owned(),
            email: normalize_email(&registration.email),
            ..registration
        };

        registration.check()?;

        let Registration {
            display_name,
            email,
            password,
        } = registration;

        let password_hash = self
            .run_hashing(move |hasher| hasher.hash_password(&password))
            .await?;

        let identity = Identity::new(display_name, email, password_hash, Role::User, now);
        let token = self.issuer.issue_at(&identity, now)?;
        let identity = self.store.save(identity).await?;

        tracing::info!(
            target: TRACING_TARGET,
            identity_id = %identity.id,
            token_id = %token.claims.token_id,
            "identity registered"
        );

        Ok(RegisterOutcome { identity, token })
    }

    /// Verifies credentials and issues a token for the matching identity.
    ///
    /// An unknown email and a wrong password are indistinguishable: both do
    /// one hash verification and fail with the same error.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::Authentication`](crate::ErrorKind::Authentication) if the
    ///   credentials do not match a registered identity.
    /// - [`ErrorKind::CorruptHash`](crate::ErrorKind::CorruptHash) if the stored
    ///   hash for the account cannot be used.
    pub async fn authenticate(&self, credentials: Credentials) -> Result<AuthenticateOutcome> {
        let Credentials { email, password } = credentials;
        let email = normalize_email(&email);

        let identity = self.store.find_by_email(&email).await?;
        let strategy = self.strategy;

        let (verified, identity) = self
            .run_hashing(move |hasher| {
                let verified = strategy.check(hasher, &password, identity.as_ref())?;
                Ok((verified, identity))
            })
            .await
            .inspect_err(|e| {
                if e.kind().is_integrity_failure() {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        error = %e,
                        "stored credential failed integrity check"
                    );
                }
            })?;

        let identity = match (verified, identity) {
            (true, Some(identity)) => identity,
            _ => {
                tracing::debug!(target: TRACING_TARGET, "authentication rejected");
                return Err(Error::authentication());
            }
        };

        let token = self.issuer.issue(&identity)?;

        tracing::info!(
            target: TRACING_TARGET,
            identity_id = %identity.id,
            token_id = %token.claims.token_id,
            "identity authenticated"
        );

        Ok(AuthenticateOutcome { identity, token })
    }

    /// Validates a session token and returns its claims.
    ///
    /// # Errors
    ///
    /// See [`TokenIssuer::validate`].
    #[inline]
    pub fn validate(&self, token: &str) -> Result<Claims> {
        self.issuer.validate(token)
    }

    /// Runs a hashing operation on the blocking pool once a permit is free.
    ///
    /// The permit moves into the blocking task and is held until the hash
    /// completes, even if the caller is dropped first.
    async fn run_hashing<T, F>(&self, operation: F) -> Result<T>
    where
        F: FnOnce(&PasswordHasher) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let permit = Arc::clone(&self.hashing_permits)
            .acquire_owned()
            .await
            .map_err(|e| {
                Error::internal("auth service", "hashing pool is closed").with_source(e)
            })?;

        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            operation(&hasher)
        })
        .await
        .map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %e,
                "hashing task failed"
            );

            Error::internal("auth service", "hashing task failed").with_source(e)
        })?
    }
}

impl fmt::Debug for AuthService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthService")
            .field("issuer", &self.issuer)
            .field("strategy", &self.strategy)
            .field("hashing_permits", &self.hashing_permits.available_permits())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::ErrorKind;
    use crate::credential::PasswordHasherConfig;
    use crate::store::InMemoryUserStore;
    use crate::token::{SessionKeysConfig, TokenConfig};

    fn config() -> AuthConfig {
        AuthConfig {
            hasher: PasswordHasherConfig::insecure_minimum(),
            session_keys: SessionKeysConfig {
                secret: Some("0123456789abcdef0123456789abcdef".to_owned()),
                ..SessionKeysConfig::default()
            },
            token: TokenConfig::default(),
        }
    }

    async fn service() -> anyhow::Result<(AuthService, InMemoryUserStore)> {
        let store = InMemoryUserStore::new();
        let service = AuthService::from_config(&config(), Arc::new(store.clone())).await?;
        Ok((service, store))
    }

    #[tokio::test]
    async fn register_then_authenticate() -> anyhow::Result<()> {
        let (service, _) = service().await?;

        let registered = service
            .register(Registration::new("Ada", "ada@x.com", "s3cret!"))
            .await?;
        let authenticated = service
            .authenticate(Credentials::new("ada@x.com", "s3cret!"))
            .await?;

        let first = service.validate(registered.token.token.as_str())?;
        let second = service.validate(authenticated.token.token.as_str())?;

        assert_eq!(first.subject, second.subject);
        assert_eq!(first.subject, registered.identity.id);
        assert_eq!(first.role, Role::User);
        assert_ne!(first.token_id, second.token_id);
        Ok(())
    }

    #[tokio::test]
    async fn register_stores_hash_not_plaintext() -> anyhow::Result<()> {
        let (service, store) = service().await?;
        service
            .register(Registration::new(" Ada ", " Ada@X.com ", "s3cret!"))
            .await?;

        let identity = store
            .find_by_email("ada@x.com")
            .await?
            .ok_or_else(|| anyhow::anyhow!("identity was not saved"))?;

        assert_eq!(identity.display_name, "Ada");
        assert_eq!(identity.role, Role::User);
        assert!(identity.password_hash.starts_with("$argon2id$"));
        assert!(!identity.password_hash.contains("s3cret!"));
        Ok(())
    }

    #[tokio::test]
    async fn failed_signing_persists_nothing() -> anyhow::Result<()> {
        let (service, store) = service().await?;

        let error = service
            .register_at(
                Registration::new("Ada", "ada@x.com", "s3cret!"),
                Timestamp::MAX,
            )
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Internal);
        assert!(store.is_empty().await);
        Ok(())
    }

    #[tokio::test]
    async fn registered_token_names_saved_identity() -> anyhow::Result<()> {
        let (service, store) = service().await?;
        let now = Timestamp::from_second(1_700_000_000)?;

        let outcome = service
            .register_at(Registration::new("Ada", "ada@x.com", "s3cret!"), now)
            .await?;
        let saved = store
            .find_by_email("ada@x.com")
            .await?
            .ok_or_else(|| anyhow::anyhow!("identity was not saved"))?;

        assert_eq!(outcome.token.claims.subject, saved.id);
        assert_eq!(outcome.token.claims.issued_at, now);
        assert_eq!(saved.created_at, now);
        Ok(())
    }

    #[tokio::test]
    async fn hashing_permit_outlives_dropped_caller() -> anyhow::Result<()> {
        let config = AuthConfig {
            hasher: PasswordHasherConfig {
                max_concurrency: 1,
                ..PasswordHasherConfig::insecure_minimum()
            },
            ..config()
        };
        let service =
            AuthService::from_config(&config, Arc::new(InMemoryUserStore::new())).await?;

        let (release, released) = std::sync::mpsc::channel::<()>();
        let pending = service.run_hashing(move |_| {
            let _ = released.recv();
            Ok(())
        });
        let dropped = tokio::time::timeout(Duration::from_millis(50), pending).await;

        assert!(dropped.is_err());
        assert_eq!(service.hashing_permits.available_permits(), 0);

        release.send(())?;
        let permit = tokio::time::timeout(
            Duration::from_secs(5),
            service.hashing_permits.acquire(),
        )
        .await??;
        drop(permit);
        Ok(())
    }

    #[tokio::test]
    async fn reject_duplicate_registration() -> anyhow::Result<()> {
        let (service, store) = service().await?;
        service
            .register(Registration::new("Ada", "ada@x.com", "s3cret!"))
            .await?;

        let error = service
            .register(Registration::new("Other Ada", "ADA@x.com", "different"))
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::DuplicateEmail);
        assert_eq!(store.len().await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn reject_invalid_registration() -> anyhow::Result<()> {
        let (service, store) = service().await?;

        let cases = [
            Registration::new("Ada", "", "s3cret!"),
            Registration::new("Ada", "ada@x.com", ""),
            Registration::new("   ", "ada@x.com", "s3cret!"),
            Registration::new("Ada", "ada", "s3cret!"),
        ];

        for registration in cases {
            let error = service.register(registration).await.unwrap_err();
            assert_eq!(error.kind(), ErrorKind::Validation);
        }

        assert!(store.is_empty().await);
        Ok(())
    }

    #[tokio::test]
    async fn failed_logins_are_indistinguishable() -> anyhow::Result<()> {
        let (service, _) = service().await?;
        service
            .register(Registration::new("Ada", "ada@x.com", "s3cret!"))
            .await?;

        let wrong_password = service
            .authenticate(Credentials::new("ada@x.com", "wrong"))
            .await
            .unwrap_err();
        let unknown_email = service
            .authenticate(Credentials::new("nobody@x.com", "s3cret!"))
            .await
            .unwrap_err();

        assert_eq!(wrong_password.kind(), ErrorKind::Authentication);
        assert_eq!(wrong_password.kind(), unknown_email.kind());
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        Ok(())
    }

    #[tokio::test]
    async fn authenticate_normalizes_email() -> anyhow::Result<()> {
        let (service, _) = service().await?;
        let registered = service
            .register(Registration::new("Ada", "ada@x.com", "s3cret!"))
            .await?;

        let authenticated = service
            .authenticate(Credentials::new("  ADA@x.com", "s3cret!"))
            .await?;

        assert_eq!(authenticated.identity.id, registered.identity.id);
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_stored_hash_is_surfaced() -> anyhow::Result<()> {
        let (service, store) = service().await?;
        store
            .save(Identity::new(
                "Ada",
                "ada@x.com",
                "$argon2id$truncated",
                Role::User,
                Timestamp::now(),
            ))
            .await?;

        let error = service
            .authenticate(Credentials::new("ada@x.com", "s3cret!"))
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::CorruptHash);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_duplicate_registrations() -> anyhow::Result<()> {
        let (service, store) = service().await?;

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move {
                    service
                        .register(Registration::new(format!("Ada {i}"), "ada@x.com", "s3cret!"))
                        .await
                })
            })
            .collect();

        let mut succeeded = 0;
        for handle in handles {
            match handle.await? {
                Ok(_) => succeeded += 1,
                Err(error) => assert_eq!(error.kind(), ErrorKind::DuplicateEmail),
            }
        }

        assert_eq!(succeeded, 1);
        assert_eq!(store.len().await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn from_config_rejects_missing_keys() {
        let config = AuthConfig {
            session_keys: SessionKeysConfig::default(),
            ..config()
        };

        let error = AuthService::from_config(&config, Arc::new(InMemoryUserStore::new()))
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Config);
    }
}
