//! Signed, time-bounded session tokens.
//!
//! [`TokenIssuer`] mints a JWT for an [`Identity`](crate::Identity) and
//! validates tokens presented back to the service. Tokens are stateless:
//! validity is a function of the signature and the expiry only.

mod claims;
mod issuer;
mod session_keys;

pub use claims::{Claims, IssuedToken, Token};
pub use issuer::{TokenConfig, TokenIssuer};
pub use session_keys::{SessionKeys, SessionKeysConfig};
