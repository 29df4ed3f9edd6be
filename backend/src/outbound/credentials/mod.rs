//! Credential adapters: password hashing and bearer tokens.

mod argon2_hasher;
mod jwt_token_issuer;

pub use argon2_hasher::Argon2PasswordHasher;
pub use jwt_token_issuer::{DEFAULT_TOKEN_TTL_DAYS, JwtTokenIssuer, MAX_TOKEN_TTL_DAYS};
