#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::credential::PasswordHasherConfig;
use crate::token::{SessionKeysConfig, TokenConfig};

/// Complete configuration of the credential issuance service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct AuthConfig {
    /// Argon2 work factor and hashing pool size.
    #[cfg_attr(feature = "config", command(flatten))]
    #[serde(default)]
    pub hasher: PasswordHasherConfig,

    /// Token signing material.
    #[cfg_attr(feature = "config", command(flatten))]
    #[serde(default)]
    pub session_keys: SessionKeysConfig,

    /// Token lifetime and addressing.
    #[cfg_attr(feature = "config", command(flatten))]
    #[serde(default)]
    pub token: TokenConfig,
}
