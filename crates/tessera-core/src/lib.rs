#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;
mod identity;

pub mod credential;
pub mod service;
pub mod store;
pub mod token;

pub use crate::error::{BoxedError, Error, ErrorKind, Result};
pub use crate::identity::{Identity, IdentityView, Role};
pub use crate::service::{AuthConfig, AuthService, AuthenticateOutcome, RegisterOutcome};
