//! Shared HTTP adapter state.
//!
//! Handlers receive this through `actix_web::web::Data` and depend only on
//! driving ports, so they can be exercised with mocks and no I/O.

use std::sync::Arc;

use crate::domain::ports::{AccountCommand, AccountQuery, ListingCommand, ListingQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountCommand>,
    pub account_query: Arc<dyn AccountQuery>,
    pub listings: Arc<dyn ListingCommand>,
    pub listing_query: Arc<dyn ListingQuery>,
}

impl HttpState {
    /// Bundle the driving ports.
    pub fn new(
        accounts: Arc<dyn AccountCommand>,
        account_query: Arc<dyn AccountQuery>,
        listings: Arc<dyn ListingCommand>,
        listing_query: Arc<dyn ListingQuery>,
    ) -> Self {
        Self {
            accounts,
            account_query,
            listings,
            listing_query,
        }
    }
}
