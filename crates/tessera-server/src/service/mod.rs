//! Application state and dependency injection.

mod config;

use std::sync::Arc;

use tessera_core::store::{InMemoryUserStore, UserStore};
use tessera_core::{AuthService, Result};

pub use crate::service::config::ServiceConfig;

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Debug, Clone)]
pub struct ServiceState {
    pub auth_service: AuthService,
}

impl ServiceState {
    /// Creates the state around an already built service.
    #[inline]
    pub fn new(auth_service: AuthService) -> Self {
        Self { auth_service }
    }

    /// Initializes application state from configuration with the given store.
    ///
    /// Loads the signing keys and verifies them before returning.
    pub async fn with_store(config: &ServiceConfig, store: Arc<dyn UserStore>) -> Result<Self> {
        let auth_service = AuthService::from_config(&config.auth, store).await?;
        Ok(Self::new(auth_service))
    }

    /// Initializes application state from configuration, keeping identities
    /// in process memory.
    pub async fn from_config(config: &ServiceConfig) -> Result<Self> {
        Self::with_store(config, Arc::new(InMemoryUserStore::new())).await
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(auth_service: AuthService);
