//! Port for one-way password hashing.

use crate::domain::{Password, PasswordHash};

use super::define_port_error;

define_port_error! {
    /// Failures raised by hashing adapters.
    pub enum CredentialError {
        /// The hasher could not produce a hash.
        Hashing { message: String } => internal: "password hashing failed: {message}",
    }
}

/// Converts plaintext passwords into storable hashes and checks them later.
///
/// Implementations may be CPU heavy; callers run them on a blocking thread.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync + 'static {
    /// Produce a salted hash of `password`.
    fn hash(&self, password: &Password) -> Result<PasswordHash, CredentialError>;

    /// Whether `password` matches `hash`. Malformed hashes never match.
    fn verify(&self, password: &Password, hash: &PasswordHash) -> bool;
}
