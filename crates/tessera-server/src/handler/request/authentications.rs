//! Authentication request types.

use std::fmt;

use serde::{Deserialize, Serialize};
use tessera_core::credential::{Credentials, Registration};
use validator::Validate;

/// Request payload for registration.
#[must_use]
#[derive(Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Register {
    /// Display name of the new identity.
    #[validate(length(min = 1, max = 128))]
    pub firstname: String,

    /// Email address, used as the login identifier.
    ///
    /// Only capped here; the format is checked after trimming and lower-casing.
    #[validate(length(max = 256))]
    pub email: String,

    /// Plaintext password.
    #[validate(length(min = 1, max = 1024))]
    pub password: String,
}

impl Register {
    /// Converts the payload into a registration candidate.
    pub fn into_registration(self) -> Registration {
        Registration::new(self.firstname, self.email, self.password)
    }
}

impl fmt::Debug for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Register")
            .field("firstname", &self.firstname)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Request payload for authentication.
///
/// Only length caps are checked here: any other mismatch is reported as
/// invalid credentials, so the response does not depend on the input shape.
#[must_use]
#[derive(Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Authenticate {
    /// Email address of the identity.
    #[validate(length(max = 254))]
    pub email: String,

    /// Plaintext password.
    #[validate(length(max = 1024))]
    pub password: String,
}

impl Authenticate {
    /// Converts the payload into credentials.
    pub fn into_credentials(self) -> Credentials {
        Credentials::new(self.email, self.password)
    }
}

impl fmt::Debug for Authenticate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticate")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}
