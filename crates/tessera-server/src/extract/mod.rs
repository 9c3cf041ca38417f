//! Request extractors with handler-style rejections.
//!
//! - [`AuthClaims`]: bearer token validation
//! - [`Json`]: JSON body deserialization
//! - [`ValidateJson`]: JSON body deserialization followed by `validator` rules

mod auth;
mod reject;

pub use crate::extract::auth::AuthClaims;
pub use crate::extract::reject::{Json, ValidateJson};
