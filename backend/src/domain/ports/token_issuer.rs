//! Port for issuing and verifying bearer tokens.
//!
//! Verification only proves the token was signed by us and is still valid. It
//! says nothing about whether the user still exists; callers look the user up
//! afterwards and report an unknown user separately.

use crate::domain::{IssuedToken, UserId};

use super::define_port_error;

define_port_error! {
    /// Token failures, kept distinct so callers can tell them apart.
    pub enum TokenError {
        /// The token was well signed but its lifetime has elapsed.
        Expired => unauthorized: "Token expired",
        /// The token is malformed or its signature does not verify.
        Invalid => unauthorized: "Invalid token",
        /// Signing a new token failed.
        Signing { message: String } => internal: "token signing failed: {message}",
    }
}

/// Issues signed, time-limited tokens binding a user id.
#[cfg_attr(test, mockall::automock)]
pub trait TokenIssuer: Send + Sync {
    /// Issue a token for `user`.
    fn issue(&self, user: &UserId) -> Result<IssuedToken, TokenError>;

    /// Verify a presented token and return the user id it binds.
    fn verify(&self, token: &str) -> Result<UserId, TokenError>;
}
