//! Presented credentials and registration candidates.

use std::fmt;

use validator::Validate;

use super::PasswordHasher;
use crate::{Error, Identity, Result};

/// Email and plaintext password presented for a single authentication call.
///
/// Consumed by value so the plaintext does not outlive the call.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    /// Creates a new set of credentials.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A registration candidate.
#[derive(Clone, Validate)]
pub struct Registration {
    /// Display name of the new principal.
    #[validate(length(min = 1, max = 128, message = "display name must not be empty"))]
    pub display_name: String,
    /// Email address, also the login identifier.
    #[validate(
        length(min = 1, max = 254, message = "email must not be empty"),
        email(message = "email is not a valid address")
    )]
    pub email: String,
    /// Plaintext password.
    #[validate(length(min = 1, max = 1024, message = "password must not be empty"))]
    pub password: String,
}

impl Registration {
    /// Creates a new registration candidate.
    pub fn new(
        display_name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    /// Checks the input shape.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Validation`](crate::ErrorKind::Validation) describing
    /// every offending field.
    pub fn check(&self) -> Result<()> {
        self.validate()
            .map_err(|e| Error::validation(e.to_string()).with_source(e))
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("display_name", &self.display_name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Trims and lower-cases an email address for storage and lookup.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// How presented credentials are checked against a stored identity.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CredentialStrategy {
    /// Plaintext password compared against the stored Argon2 hash.
    #[default]
    PasswordMatch,
}

impl CredentialStrategy {
    /// Checks a plaintext password against the identity found for the login
    /// identifier, or against a throwaway hash when none was found.
    ///
    /// Both branches do the same amount of hashing work.
    ///
    /// # Errors
    ///
    /// Propagates [`ErrorKind::CorruptHash`](crate::ErrorKind::CorruptHash) from
    /// the stored hash; a mismatch is `Ok(false)`.
    pub fn check(
        self,
        hasher: &PasswordHasher,
        password: &str,
        identity: Option<&Identity>,
    ) -> Result<bool> {
        match self {
            Self::PasswordMatch => match identity {
                Some(identity) => hasher.verify_password(password, &identity.password_hash),
                None => Ok(hasher.verify_dummy_password(password)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use uuid::Uuid;

    use super::*;
    use crate::credential::PasswordHasherConfig;
    use crate::{ErrorKind, Role};

    #[test]
    fn registration_accepts_well_formed_input() {
        let registration = Registration::new("Ada", "ada@x.com", "s3cret!");
        assert!(registration.check().is_ok());
    }

    #[test]
    fn registration_rejects_empty_fields() {
        let cases = [
            Registration::new("", "ada@x.com", "s3cret!"),
            Registration::new("Ada", "", "s3cret!"),
            Registration::new("Ada", "ada@x.com", ""),
            Registration::new("Ada", "not-an-email", "s3cret!"),
        ];

        for registration in cases {
            let error = registration.check().unwrap_err();
            assert_eq!(error.kind(), ErrorKind::Validation);
        }
    }

    #[test]
    fn debug_redacts_plaintext() {
        let credentials = Credentials::new("ada@x.com", "s3cret!");
        let registration = Registration::new("Ada", "ada@x.com", "s3cret!");

        assert!(!format!("{credentials:?}").contains("s3cret!"));
        assert!(!format!("{registration:?}").contains("s3cret!"));
    }

    #[test]
    fn normalizes_email() {
        assert_eq!(normalize_email("  Ada@X.com "), "ada@x.com");
    }

    #[test]
    fn password_match_strategy() -> anyhow::Result<()> {
        let hasher = PasswordHasher::new(&PasswordHasherConfig::insecure_minimum())?;
        let identity = Identity {
            id: Uuid::now_v7(),
            display_name: "Ada".to_owned(),
            email: "ada@x.com".to_owned(),
            password_hash: hasher.hash_password("s3cret!")?,
            role: Role::User,
            created_at: Timestamp::now(),
        };

        let strategy = CredentialStrategy::PasswordMatch;
        assert!(strategy.check(&hasher, "s3cret!", Some(&identity))?);
        assert!(!strategy.check(&hasher, "wrong", Some(&identity))?);
        assert!(!strategy.check(&hasher, "s3cret!", None)?);

        Ok(())
    }
}
