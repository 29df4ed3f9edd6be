//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use chrono::Duration;

use crate::outbound::credentials::DEFAULT_TOKEN_TTL_DAYS;
use crate::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
#[derive(Clone)]
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) jwt_secret: Vec<u8>,
    pub(crate) token_ttl: Duration,
    pub(crate) allowed_origins: Vec<String>,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Construct a configuration with in-memory stores and no origin allow-list.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, jwt_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            bind_addr,
            jwt_secret: jwt_secret.into(),
            token_ttl: Duration::days(DEFAULT_TOKEN_TTL_DAYS),
            allowed_origins: Vec::new(),
            db_pool: None,
        }
    }

    /// Override the bearer token lifetime.
    #[must_use]
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Origins allowed to open a WebSocket connection.
    #[must_use]
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = origins;
        self
    }

    /// Attach a database connection pool.
    ///
    /// When provided, the Diesel repositories replace the in-memory stores.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// Whether the server will use the database-backed stores.
    #[must_use]
    pub fn uses_database(&self) -> bool {
        self.db_pool.is_some()
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("bind_addr", &self.bind_addr)
            .field("token_ttl", &self.token_ttl)
            .field("allowed_origins", &self.allowed_origins)
            .field("uses_database", &self.uses_database())
            .finish_non_exhaustive()
    }
}
