//! Authentication primitives: login credentials, signup payloads, and tokens.
//!
//! Inbound adapters build these from raw strings so handlers never pass
//! unvalidated input to a port or service.

use std::fmt;

use chrono::{DateTime, Utc};
use zeroize::Zeroizing;

use crate::domain::{Email, Plan, PlanParseError, UserName, UserValidationError};

/// Minimum length accepted for a new password.
pub const PASSWORD_MIN: usize = 6;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Email was missing or blank once trimmed.
    #[error("email must not be empty")]
    EmptyEmail,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Plaintext password supplied by a caller.
///
/// Zeroed on drop. Only a `PasswordHasher` should ever read it.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Wrap a password without applying strength rules (used for login).
    pub fn new(raw: &str) -> Self {
        Self(Zeroizing::new(raw.to_owned()))
    }

    /// Wrap a password chosen at signup or change time.
    pub fn try_new(raw: &str) -> Result<Self, SignupValidationError> {
        if raw.chars().count() < PASSWORD_MIN {
            return Err(SignupValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        Ok(Self::new(raw))
    }

    /// Plaintext value.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Validated login credentials used by the identity store.
///
/// # Examples
/// ```
/// use listings_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" ada@example.com ", "secret")
///     .expect("valid credentials");
/// assert_eq!(creds.email(), "ada@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Password,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = email.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            email: normalized.to_lowercase(),
            password: Password::new(password),
        })
    }

    /// Lowercased email used for the user lookup.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &Password {
        &self.password
    }
}

/// Validation errors raised while building a [`NewAccount`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignupValidationError {
    #[error(transparent)]
    User(#[from] UserValidationError),
    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },
    #[error(transparent)]
    Plan(#[from] PlanParseError),
}

/// Validated signup request. The plan defaults to Standard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub name: UserName,
    pub email: Email,
    pub password: Password,
    pub plan: Plan,
}

impl NewAccount {
    /// Validate raw signup inputs.
    pub fn try_from_parts(
        name: &str,
        email: &str,
        password: &str,
        plan: Option<&str>,
    ) -> Result<Self, SignupValidationError> {
        let plan = match plan {
            Some(raw) => raw.parse::<Plan>()?,
            None => Plan::default(),
        };
        Ok(Self {
            name: UserName::new(name)?,
            email: Email::new(email)?,
            password: Password::try_new(password)?,
            plan,
        })
    }
}

/// Optional changes applied to an existing user through the identity store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub name: Option<UserName>,
    pub plan: Option<Plan>,
    pub password: Option<Password>,
}

impl UserUpdate {
    /// Change only the plan tier.
    pub fn plan(plan: Plan) -> Self {
        Self {
            plan: Some(plan),
            ..Self::default()
        }
    }
}

/// Signed bearer token with its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}
