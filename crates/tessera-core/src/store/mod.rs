//! User store contract.
//!
//! The store is an external collaborator; this module only fixes the contract
//! the credential flows rely on and ships an in-memory implementation of it.
//!
//! - [`UserStore`]: lookup by email and atomic insert
//! - [`InMemoryUserStore`]: process-local implementation

mod memory;

pub use memory::InMemoryUserStore;

use crate::{Identity, Result};

/// Tracing target for user store operations.
pub const TRACING_TARGET: &str = "tessera_core::store";

/// Persistence contract for identities.
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Finds the identity registered under a normalized email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>>;

    /// Persists a new identity and returns it as stored.
    ///
    /// Must check for an existing email and insert as one atomic step.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::DuplicateEmail`](crate::ErrorKind::DuplicateEmail)
    /// if the email is already registered; nothing is written in that case.
    async fn save(&self, identity: Identity) -> Result<Identity>;
}
