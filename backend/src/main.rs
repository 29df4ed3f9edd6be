//! Backend entry-point: loads settings, prepares storage, and serves the
//! REST API, WebSocket entry, and OpenAPI docs.

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use listings_backend::inbound::http::health::HealthState;
use listings_backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use listings_backend::server::{ServerConfig, create_server};
use listings_backend::settings::AppSettings;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os()).map_err(std::io::Error::other)?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let jwt_secret = settings.jwt_secret().map_err(std::io::Error::other)?;
    let token_ttl = settings.token_ttl().map_err(std::io::Error::other)?;

    let mut config = ServerConfig::new(bind_addr, jwt_secret)
        .with_token_ttl(token_ttl)
        .with_allowed_origins(settings.allowed_origins());

    if let Some(database_url) = settings.database_url() {
        config = config.with_db_pool(connect_database(database_url, &settings).await?);
    } else {
        warn!("LISTINGS_DATABASE_URL not set; using in-memory stores");
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, &config)?;
    info!(addr = %bind_addr, "listings backend listening");
    server.await
}

async fn connect_database(
    database_url: &str,
    settings: &AppSettings,
) -> std::io::Result<DbPool> {
    let url = database_url.to_owned();
    let applied = web::block(move || run_pending_migrations(&url))
        .await
        .map_err(std::io::Error::other)?
        .map_err(std::io::Error::other)?;
    info!(applied, "database migrations complete");

    let pool_config = PoolConfig::new(database_url).with_max_size(settings.db_max_connections());
    DbPool::new(pool_config)
        .await
        .map_err(std::io::Error::other)
}
