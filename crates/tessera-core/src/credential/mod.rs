//! Credential verification: password hashing and the closed set of
//! strategies used to check presented credentials.

mod credentials;
mod password_hasher;

pub use credentials::{CredentialStrategy, Credentials, Registration, normalize_email};
pub use password_hasher::{PasswordHasher, PasswordHasherConfig};
