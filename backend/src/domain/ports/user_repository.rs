//! Port abstraction for user persistence adapters and their errors.
//!
//! The repository only ever receives [`User`] records whose credential is
//! already a [`PasswordHash`](crate::domain::PasswordHash). Hashing happens in
//! [`IdentityStore`](crate::domain::IdentityStore) before any call here.
use async_trait::async_trait;

use crate::domain::{User, UserId, UserSummary};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => service_unavailable: "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => internal: "user repository query failed: {message}",
        /// Another account already uses the email address.
        DuplicateEmail => conflict: "Email already exists",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. Fails with `DuplicateEmail` when the email is taken.
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Replace the mutable fields of an existing user.
    ///
    /// Returns `false` when no user with that id exists.
    async fn update(&self, user: &User) -> Result<bool, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by normalised (lowercase) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserPersistenceError>;

    /// Summaries for every id that exists; unknown ids are skipped.
    async fn find_summaries(
        &self,
        ids: &[UserId],
    ) -> Result<Vec<UserSummary>, UserPersistenceError>;
}
