//! Builders wiring driven adapters into the HTTP and WebSocket state.
//!
//! Both transports share one [`ChannelRegistry`]: listing mutations publish
//! through it and live connections join and leave channels on it.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};

use crate::domain::ports::{BusinessRepository, UserRepository};
use crate::domain::{AccountService, IdentityStore, ListingService};
use crate::inbound::http::state::HttpState;
use crate::inbound::ws::state::{OriginAllowList, WsState};
use crate::outbound::credentials::{Argon2PasswordHasher, JwtTokenIssuer};
use crate::outbound::memory::{InMemoryBusinessRepository, InMemoryUserRepository};
use crate::outbound::notifications::ChannelRegistry;
use crate::outbound::persistence::{DieselBusinessRepository, DieselUserRepository};

use super::ServerConfig;

/// Adapter state shared by every worker.
#[derive(Clone)]
pub struct AppStates {
    pub http: HttpState,
    pub ws: WsState,
    pub registry: Arc<ChannelRegistry>,
}

/// Build adapter state using Diesel repositories when a pool is configured,
/// otherwise fresh in-memory stores.
pub fn build_states(config: &ServerConfig) -> AppStates {
    match &config.db_pool {
        Some(pool) => assemble(
            Arc::new(DieselUserRepository::new(pool.clone())),
            Arc::new(DieselBusinessRepository::new(pool.clone())),
            config,
        ),
        None => build_in_memory_states(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryBusinessRepository::new()),
            config,
        ),
    }
}

/// Build adapter state over caller-provided in-memory stores.
///
/// Lets callers seed users (for example an admin) before serving traffic.
pub fn build_in_memory_states(
    users: Arc<InMemoryUserRepository>,
    businesses: Arc<InMemoryBusinessRepository>,
    config: &ServerConfig,
) -> AppStates {
    assemble(users, businesses, config)
}

fn assemble<U, B>(users: Arc<U>, businesses: Arc<B>, config: &ServerConfig) -> AppStates
where
    U: UserRepository + 'static,
    B: BusinessRepository + 'static,
{
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let registry = Arc::new(ChannelRegistry::new());

    let identity = IdentityStore::new(
        users.clone(),
        Arc::new(Argon2PasswordHasher::new()),
        clock.clone(),
    );
    let tokens = Arc::new(
        JwtTokenIssuer::new(&config.jwt_secret, clock.clone()).with_ttl(config.token_ttl),
    );
    let accounts = Arc::new(AccountService::new(identity, tokens));
    let listings = Arc::new(ListingService::new(
        businesses,
        users,
        registry.clone(),
        clock,
    ));

    let http = HttpState::new(
        accounts.clone(),
        accounts.clone(),
        listings.clone(),
        listings,
    );
    let ws = WsState::new(
        accounts,
        registry.clone(),
        OriginAllowList::new(&config.allowed_origins),
    );

    AppStates { http, ws, registry }
}
