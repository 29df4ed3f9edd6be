//! Driving port for account mutations: signup, login, and plan changes.
//!
//! Inbound adapters call this port with already validated inputs and never see
//! password hashes or token signing keys.

use async_trait::async_trait;

use crate::domain::{Error, IssuedToken, LoginCredentials, NewAccount, Plan, User, UserId};

/// Freshly issued credential and the account it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSession {
    pub token: IssuedToken,
    pub user: User,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Create an account and sign it in.
    ///
    /// # Errors
    ///
    /// `Conflict` when the email is already registered.
    async fn signup(&self, account: NewAccount) -> Result<AccountSession, Error>;

    /// Check credentials and issue a new token.
    ///
    /// # Errors
    ///
    /// `Unauthorized` with "Invalid credentials" for unknown emails and wrong
    /// passwords alike.
    async fn login(&self, credentials: LoginCredentials) -> Result<AccountSession, Error>;

    /// Move the user to another plan tier. Existing listings are kept.
    async fn change_plan(&self, user: &UserId, plan: Plan) -> Result<User, Error>;
}
