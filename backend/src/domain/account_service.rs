//! Account use-cases: signup, login, plan changes, and token authentication.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{
    AccountCommand, AccountQuery, AccountSession, PasswordHasher, TokenError, TokenIssuer,
    UserRepository,
};
use crate::domain::{
    Error, IdentityStore, LoginCredentials, NewAccount, Plan, User, UserId, UserUpdate,
};

/// Account service implementing the account driving ports.
#[derive(Clone)]
pub struct AccountService<R, H, T> {
    identity: IdentityStore<R, H>,
    tokens: Arc<T>,
}

impl<R, H, T> AccountService<R, H, T> {
    /// Create a service over an identity store and a token issuer.
    pub fn new(identity: IdentityStore<R, H>, tokens: Arc<T>) -> Self {
        Self { identity, tokens }
    }
}

impl<R, H, T> AccountService<R, H, T>
where
    R: UserRepository,
    H: PasswordHasher,
    T: TokenIssuer,
{
    fn open_session(&self, user: User) -> Result<AccountSession, Error> {
        let token = self.tokens.issue(&user.id)?;
        Ok(AccountSession { token, user })
    }
}

fn token_error(error: TokenError) -> Error {
    let reason = match error {
        TokenError::Expired => "token_expired",
        TokenError::Invalid => "token_invalid",
        TokenError::Signing { .. } => return error.into(),
    };
    Error::from(error).with_details(json!({ "reason": reason }))
}

#[async_trait]
impl<R, H, T> AccountCommand for AccountService<R, H, T>
where
    R: UserRepository,
    H: PasswordHasher,
    T: TokenIssuer,
{
    async fn signup(&self, account: NewAccount) -> Result<AccountSession, Error> {
        let user = self.identity.create(account).await?;
        self.open_session(user)
    }

    async fn login(&self, credentials: LoginCredentials) -> Result<AccountSession, Error> {
        let user = self.identity.authenticate(&credentials).await?;
        info!(user_id = %user.id, "user logged in");
        self.open_session(user)
    }

    async fn change_plan(&self, user: &UserId, plan: Plan) -> Result<User, Error> {
        let updated = self.identity.update(user, UserUpdate::plan(plan)).await?;
        info!(user_id = %updated.id, plan = %plan, "plan changed");
        Ok(updated)
    }
}

#[async_trait]
impl<R, H, T> AccountQuery for AccountService<R, H, T>
where
    R: UserRepository,
    H: PasswordHasher,
    T: TokenIssuer,
{
    async fn authenticate(&self, token: &str) -> Result<User, Error> {
        let user_id = self.tokens.verify(token).map_err(token_error)?;
        self.identity.find_by_id(&user_id).await?.ok_or_else(|| {
            Error::unauthorized("User not found").with_details(json!({ "reason": "unknown_user" }))
        })
    }

    async fn profile(&self, user: &UserId) -> Result<User, Error> {
        self.identity.require(user).await
    }
}
