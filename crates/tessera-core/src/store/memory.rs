use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::{TRACING_TARGET, UserStore};
use crate::{Error, Identity, Result};

/// User store kept in process memory, keyed by normalized email.
///
/// Cheap to clone; clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserStore {
    inner: Arc<RwLock<HashMap<String, Identity>>>,
}

impl InMemoryUserStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored identities.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Returns `true` if no identity is stored.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>> {
        Ok(self.inner.read().await.get(email).cloned())
    }

    async fn save(&self, identity: Identity) -> Result<Identity> {
        let mut inner = self.inner.write().await;
        if inner.contains_key(&identity.email) {
            tracing::debug!(
                target: TRACING_TARGET,
                "rejected registration of an existing email"
            );

            return Err(Error::duplicate_email());
        }

        inner.insert(identity.email.clone(), identity.clone());

        tracing::debug!(
            target: TRACING_TARGET,
            identity_id = %identity.id,
            "identity saved"
        );

        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;
    use crate::{ErrorKind, Role};

    fn new_identity(email: &str) -> Identity {
        Identity::new(
            "Ada",
            email,
            "$argon2id$v=19$m=8,t=1,p=1$c2FsdHNhbHQ$aGFzaA",
            Role::User,
            Timestamp::now(),
        )
    }

    #[tokio::test]
    async fn save_then_find() -> anyhow::Result<()> {
        let store = InMemoryUserStore::new();
        assert!(store.is_empty().await);

        let saved = store.save(new_identity("ada@x.com")).await?;
        let found = store.find_by_email("ada@x.com").await?;

        assert_eq!(found, Some(saved));
        assert_eq!(store.len().await, 1);
        assert!(store.find_by_email("bob@x.com").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn reject_duplicate_email() -> anyhow::Result<()> {
        let store = InMemoryUserStore::new();
        let first = store.save(new_identity("ada@x.com")).await?;

        let error = store.save(new_identity("ada@x.com")).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::DuplicateEmail);

        assert_eq!(store.len().await, 1);
        assert_eq!(store.find_by_email("ada@x.com").await?, Some(first));
        Ok(())
    }

    #[tokio::test]
    async fn keeps_given_id() -> anyhow::Result<()> {
        let store = InMemoryUserStore::new();
        let identity = new_identity("ada@x.com");

        let saved = store.save(identity.clone()).await?;

        assert_eq!(saved.id, identity.id);
        assert_eq!(saved.created_at, identity.created_at);
        Ok(())
    }
}
