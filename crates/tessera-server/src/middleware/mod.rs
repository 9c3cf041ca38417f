//! Middleware for `axum::Router`.
//!
//! - Observability: request ids, tracing spans, sensitive header redaction
//! - Recovery: handler panics, request timeouts, service errors

mod observability;
mod recovery;

pub use crate::middleware::observability::RouterObservabilityExt;
pub use crate::middleware::recovery::{RecoveryConfig, RouterRecoveryExt};
