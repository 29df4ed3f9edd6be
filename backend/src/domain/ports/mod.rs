//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, credentials, notifications) are implemented in
//! `outbound`. Driving ports (account and listing commands and queries) are
//! implemented by the domain services and called from `inbound`.

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod account_query;
mod business_repository;
mod listing_command;
mod listing_query;
mod notification_publisher;
mod password_hasher;
mod token_issuer;
mod user_repository;

#[cfg(test)]
pub use account_command::MockAccountCommand;
pub use account_command::{AccountCommand, AccountSession};
#[cfg(test)]
pub use account_query::MockAccountQuery;
pub use account_query::AccountQuery;
#[cfg(test)]
pub use business_repository::MockBusinessRepository;
pub use business_repository::{BusinessPersistenceError, BusinessRepository};
#[cfg(test)]
pub use listing_command::MockListingCommand;
pub use listing_command::ListingCommand;
#[cfg(test)]
pub use listing_query::MockListingQuery;
pub use listing_query::ListingQuery;
#[cfg(test)]
pub use notification_publisher::{MockChannelMembership, MockNotificationPublisher};
pub use notification_publisher::{
    ChannelMembership, ConnectionHandle, ConnectionId, NotificationPublisher,
};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{CredentialError, PasswordHasher};
#[cfg(test)]
pub use token_issuer::MockTokenIssuer;
pub use token_issuer::{TokenError, TokenIssuer};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
