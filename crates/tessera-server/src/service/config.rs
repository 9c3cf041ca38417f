#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use tessera_core::AuthConfig;

/// App [`state`] configuration.
///
/// [`state`]: crate::service::ServiceState
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct ServiceConfig {
    /// Credential hashing and token signing configuration.
    #[cfg_attr(feature = "config", command(flatten))]
    #[serde(default)]
    pub auth: AuthConfig,
}
