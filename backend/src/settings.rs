//! Server settings loaded via OrthoConfig.
//!
//! Values are layered from CLI flags, `LISTINGS_*` environment variables,
//! and configuration files. Every field is optional; accessors supply the
//! defaults.

use std::net::SocketAddr;

use chrono::Duration;
use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::outbound::credentials::{DEFAULT_TOKEN_TTL_DAYS, MAX_TOKEN_TTL_DAYS};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:5173";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
#[cfg(debug_assertions)]
const DEVELOPMENT_JWT_SECRET: &str = "listings-development-secret";

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address {value}: {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("LISTINGS_JWT_SECRET must be set")]
    MissingJwtSecret,
    #[error("token lifetime must be between 1 and {MAX_TOKEN_TTL_DAYS} days, got {0}")]
    InvalidTokenTtl(i64),
}

/// Runtime configuration for the listings server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "LISTINGS")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string. In-memory stores are used when absent.
    pub database_url: Option<String>,
    /// Shared secret used to sign bearer tokens.
    pub jwt_secret: Option<String>,
    /// Bearer token lifetime in days.
    pub token_ttl_days: Option<i64>,
    /// Comma-separated origins allowed to open WebSocket connections.
    pub allowed_origins: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
}

impl AppSettings {
    /// Parsed listen address.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidBindAddr`] when the value does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value
            .parse()
            .map_err(|source| SettingsError::InvalidBindAddr {
                value: value.to_owned(),
                source,
            })
    }

    /// Token signing secret. Debug builds fall back to a development secret.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::MissingJwtSecret`] in release builds when no
    /// secret is configured.
    pub fn jwt_secret(&self) -> Result<String, SettingsError> {
        match self.jwt_secret.as_deref().map(str::trim) {
            Some(secret) if !secret.is_empty() => Ok(secret.to_owned()),
            _ => development_secret(),
        }
    }

    /// Bearer token lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidTokenTtl`] outside
    /// `1..=MAX_TOKEN_TTL_DAYS`.
    pub fn token_ttl(&self) -> Result<Duration, SettingsError> {
        let days = self.token_ttl_days.unwrap_or(DEFAULT_TOKEN_TTL_DAYS);
        if !(1..=MAX_TOKEN_TTL_DAYS).contains(&days) {
            return Err(SettingsError::InvalidTokenTtl(days));
        }
        Duration::try_days(days).ok_or(SettingsError::InvalidTokenTtl(days))
    }

    /// Allowed WebSocket origins.
    pub fn allowed_origins(&self) -> Vec<String> {
        self.allowed_origins
            .as_deref()
            .unwrap_or(DEFAULT_ALLOWED_ORIGINS)
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_owned)
            .collect()
    }

    /// Database URL, when persistence is configured.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Pool size for database connections.
    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }
}

#[cfg(debug_assertions)]
fn development_secret() -> Result<String, SettingsError> {
    tracing::warn!("LISTINGS_JWT_SECRET not set; using development secret");
    Ok(DEVELOPMENT_JWT_SECRET.to_owned())
}

#[cfg(not(debug_assertions))]
fn development_secret() -> Result<String, SettingsError> {
    Err(SettingsError::MissingJwtSecret)
}
