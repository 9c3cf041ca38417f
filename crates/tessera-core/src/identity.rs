//! Registered principals and their roles.

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

/// Role carried in the identity and in every issued token.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Regular account, assigned on registration.
    #[default]
    User,
    /// Administrative account.
    Admin,
}

/// A registered principal as held by the user store.
///
/// Does not implement `Serialize`: the password hash must never leave the
/// process. Use [`IdentityView`] for anything sent outward.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    /// Unique identifier, fixed on creation.
    pub id: Uuid,
    /// Display name given at registration.
    pub display_name: String,
    /// Normalized email address, unique across the store.
    pub email: String,
    /// PHC-formatted password hash.
    pub password_hash: String,
    /// Role of the principal.
    pub role: Role,
    /// Creation time.
    pub created_at: Timestamp,
}

impl Identity {
    /// Creates a not yet persisted identity with a fresh UUID v7.
    pub fn new(
        display_name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        role: Role,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            display_name: display_name.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            role,
            created_at,
        }
    }

    /// Returns the outward representation without the password hash.
    #[must_use]
    pub fn view(&self) -> IdentityView {
        IdentityView {
            id: self.id,
            display_name: self.display_name.clone(),
            email: self.email.clone(),
            role: self.role,
            created_at: self.created_at,
        }
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("role", &self.role)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Serializable identity without any credential material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityView {
    pub id: Uuid,
    pub display_name: String,
    pub email: String,
    pub role: Role,
    pub created_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn identity() -> Identity {
        Identity::new(
            "Ada",
            "ada@x.com",
            "$argon2id$v=19$m=8,t=1,p=1$c2FsdHNhbHQ$aGFzaA",
            Role::User,
            Timestamp::now(),
        )
    }

    #[test]
    fn role_round_trips_through_strings() {
        assert_eq!(Role::User.to_string(), "USER");
        assert_eq!(Role::from_str("ADMIN").ok(), Some(Role::Admin));
        assert_eq!(Role::default(), Role::User);
    }

    #[test]
    fn role_serializes_upper_case() -> anyhow::Result<()> {
        assert_eq!(serde_json::to_string(&Role::Admin)?, "\"ADMIN\"");
        Ok(())
    }

    #[test]
    fn debug_redacts_password_hash() {
        let debug = format!("{:?}", identity());
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("argon2id"));
    }

    #[test]
    fn new_identities_get_distinct_ids() {
        assert_ne!(identity().id, identity().id);
    }

    #[test]
    fn view_has_no_password_hash() -> anyhow::Result<()> {
        let json = serde_json::to_string(&identity().view())?;
        assert!(!json.contains("argon2id"));
        assert!(json.contains("ada@x.com"));
        assert!(json.contains("displayName"));
        Ok(())
    }
}
