//! Identity store: user records, credentials, plan tier, and role.
//!
//! Plaintext passwords enter through [`IdentityStore::create`] and
//! [`IdentityStore::update`] only. Both run the hashing step before anything
//! reaches the [`UserRepository`], whose API accepts hashes alone, so there is
//! no write path that skips it. Hashing and verification run on the blocking
//! thread pool.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use crate::domain::ports::{PasswordHasher, UserPersistenceError, UserRepository};
use crate::domain::{
    BusinessId, Error, LoginCredentials, NewAccount, Password, PasswordHash, Role, User,
    UserDirectory, UserId, UserUpdate,
};

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const USER_NOT_FOUND: &str = "User not found";

/// User store wrapping a repository and a password hasher.
#[derive(Clone)]
pub struct IdentityStore<R, H> {
    users: Arc<R>,
    hasher: Arc<H>,
    clock: Arc<dyn Clock>,
}

impl<R, H> IdentityStore<R, H> {
    /// Create a store over the given repository and hasher.
    pub fn new(users: Arc<R>, hasher: Arc<H>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            hasher,
            clock,
        }
    }
}

impl<R, H> IdentityStore<R, H>
where
    R: UserRepository,
    H: PasswordHasher,
{
    async fn hash_credential(&self, password: &Password) -> Result<PasswordHash, Error> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(credential_task_failed)?
            .map_err(Error::from)
    }

    async fn verify_credential(
        &self,
        password: &Password,
        hash: &PasswordHash,
    ) -> Result<bool, Error> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.clone();
        let hash = hash.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(credential_task_failed)
    }

    /// Register a new user with the Standard plan unless another was chosen.
    ///
    /// # Errors
    ///
    /// `Conflict("Email already exists")` when the email is taken.
    pub async fn create(&self, account: NewAccount) -> Result<User, Error> {
        if self
            .users
            .find_by_email(account.email.as_ref())
            .await?
            .is_some()
        {
            return Err(UserPersistenceError::duplicate_email().into());
        }

        let password_hash = self.hash_credential(&account.password).await?;
        let now = self.clock.utc();
        let user = User {
            id: UserId::random(),
            name: account.name,
            email: account.email,
            password_hash,
            plan: account.plan,
            role: Role::User,
            saved_businesses: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.users.insert(&user).await?;
        info!(user_id = %user.id, plan = %user.plan, "user created");
        Ok(user)
    }

    /// Apply optional name, plan, and password changes.
    pub async fn update(&self, id: &UserId, changes: UserUpdate) -> Result<User, Error> {
        let mut user = self.require(id).await?;

        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(plan) = changes.plan {
            user.plan = plan;
        }
        if let Some(password) = changes.password {
            user.password_hash = self.hash_credential(&password).await?;
        }
        user.updated_at = self.clock.utc();

        if !self.users.update(&user).await? {
            return Err(Error::not_found(USER_NOT_FOUND));
        }
        Ok(user)
    }

    /// Check login credentials.
    ///
    /// Unknown emails and wrong passwords produce the same error.
    pub async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let Some(user) = self.users.find_by_email(credentials.email()).await? else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        if !self
            .verify_credential(credentials.password(), &user.password_hash)
            .await?
        {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        Ok(user)
    }

    /// Look a user up by id.
    pub async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error> {
        Ok(self.users.find_by_id(id).await?)
    }

    /// Look a user up by email; the address is matched case-insensitively.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        Ok(self
            .users
            .find_by_email(&email.trim().to_lowercase())
            .await?)
    }

    /// Load a user or fail with `NotFound`.
    pub async fn require(&self, id: &UserId) -> Result<User, Error> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(USER_NOT_FOUND))
    }

    /// Summaries for `ids`, indexed for reference resolution.
    pub async fn find_summaries(&self, ids: &[UserId]) -> Result<UserDirectory, Error> {
        Ok(UserDirectory::new(self.users.find_summaries(ids).await?))
    }

    /// Listings the user has saved. There is no write path yet.
    pub async fn saved_businesses(&self, id: &UserId) -> Result<Vec<BusinessId>, Error> {
        Ok(self.require(id).await?.saved_businesses)
    }
}

fn credential_task_failed(err: tokio::task::JoinError) -> Error {
    Error::internal(format!("credential task failed: {err}"))
}
