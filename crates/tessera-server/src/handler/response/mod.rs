//! Response types for HTTP handlers.

mod authentications;
mod error_response;

pub use authentications::*;
pub use error_response::ErrorResponse;
