//! Driving port resolving presented credentials into users.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountQuery: Send + Sync {
    /// Verify a bearer token and load the user it names.
    ///
    /// Expired or tampered tokens and tokens naming an unknown user all fail
    /// with `Unauthorized`, each with its own message and `details.reason`.
    async fn authenticate(&self, token: &str) -> Result<User, Error>;

    /// Load the profile of an existing user.
    async fn profile(&self, user: &UserId) -> Result<User, Error>;
}
