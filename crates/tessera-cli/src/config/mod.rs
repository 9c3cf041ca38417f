//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── server: ServerConfig          # Host, port, shutdown
//! ├── middleware: MiddlewareConfig  # Request timeout
//! ├── service: ServiceConfig        # Hashing, signing keys, token lifetime
//! └── log_format: LogFormat         # Text or JSON logs
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.

mod middleware;
mod server;

use std::process;

use anyhow::Context;
use clap::{Parser, ValueEnum};
pub use middleware::MiddlewareConfig;
use serde::{Deserialize, Serialize};
pub use server::ServerConfig;
use tessera_server::service::ServiceConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_SERVER_STARTUP};

/// Output format of the log subscriber.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "tessera")]
#[command(about = "Tessera credential issuance server")]
#[command(version)]
pub struct Cli {
    /// Server network and lifecycle configuration.
    #[clap(flatten)]
    pub server: ServerConfig,

    /// HTTP middleware configuration.
    #[clap(flatten)]
    pub middleware: MiddlewareConfig,

    /// Credential hashing and token signing configuration.
    #[clap(flatten)]
    pub service: ServiceConfig,

    /// Log output format.
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Cli {
    /// Loads the `.env` file (if enabled) and parses CLI arguments.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Installs the global subscriber. `RUST_LOG` overrides the `info` default.
    pub fn init_tracing(&self) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let registry = tracing_subscriber::registry().with(filter);

        match self.log_format {
            LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
            LogFormat::Json => registry
                .with(tracing_subscriber::fmt::layer().json())
                .init(),
        }
    }

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.server
            .validate()
            .context("invalid server configuration")?;
        self.middleware
            .validate()
            .context("invalid middleware configuration")?;
        Ok(())
    }

    /// Logs configuration without secrets.
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_SERVER_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "build information"
        );

        self.server.log();
        self.middleware.log();

        let auth = &self.service.auth;
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            hash_memory_cost_kib = auth.hasher.memory_cost_kib,
            hash_time_cost = auth.hasher.time_cost,
            hash_parallelism = auth.hasher.parallelism,
            hash_max_concurrency = auth.hasher.max_concurrency,
            shared_secret = auth.session_keys.secret.is_some(),
            token_ttl_secs = auth.token.ttl_secs,
            token_issuer = %auth.token.issuer,
            token_audience = %auth.token.audience,
            "authentication configuration"
        );
    }

    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE_ARGS: [&str; 5] = ["tessera", "--host", "127.0.0.1", "--port", "3000"];

    #[test]
    fn parse_defaults() -> anyhow::Result<()> {
        let args = BASE_ARGS
            .into_iter()
            .chain(["--session-secret", "0123456789abcdef0123456789abcdef"]);
        let cli = Cli::try_parse_from(args)?;

        assert!(cli.validate().is_ok());
        assert_eq!(cli.log_format, LogFormat::Text);
        assert_eq!(cli.service.auth.token.ttl_secs, 86400);
        assert_eq!(
            cli.service.auth.session_keys.secret.as_deref(),
            Some("0123456789abcdef0123456789abcdef")
        );
        Ok(())
    }

    #[test]
    fn parse_overrides() -> anyhow::Result<()> {
        let args = BASE_ARGS.into_iter().chain([
            "--log-format",
            "json",
            "--token-ttl-secs",
            "60",
            "--hash-time-cost",
            "3",
            "--request-timeout",
            "10",
        ]);
        let cli = Cli::try_parse_from(args)?;

        assert_eq!(cli.log_format, LogFormat::Json);
        assert_eq!(cli.service.auth.token.ttl_secs, 60);
        assert_eq!(cli.service.auth.hasher.time_cost, 3);
        assert_eq!(cli.middleware.recovery.request_timeout, 10);
        Ok(())
    }

    #[test]
    fn reject_unknown_log_format() {
        let args = BASE_ARGS.into_iter().chain(["--log-format", "xml"]);
        assert!(Cli::try_parse_from(args).is_err());
    }
}
