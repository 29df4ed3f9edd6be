//! Ports for live notification fan-out.
//!
//! [`NotificationPublisher`] is what listing mutations call after a write has
//! committed. [`ChannelMembership`] is what live connections use to join and
//! leave channels. Both are usually served by the same registry.

use std::fmt;

use tokio::sync::mpsc;

use crate::domain::{BusinessEvent, ChannelId};

/// Process-local identifier of a live connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Wrap a raw connection counter value.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A registered connection and the queue its events arrive on.
#[derive(Debug)]
pub struct ConnectionHandle {
    pub id: ConnectionId,
    pub events: mpsc::Receiver<BusinessEvent>,
}

/// Best-effort delivery of listing events to joined connections.
#[cfg_attr(test, mockall::automock)]
pub trait NotificationPublisher: Send + Sync {
    /// Queue `event` for every connection joined to its channel.
    ///
    /// Returns how many connections the event was queued for. Delivery
    /// failures are logged by the implementation and never surface here.
    fn publish(&self, event: &BusinessEvent) -> usize;
}

/// Connection lifecycle and channel membership.
#[cfg_attr(test, mockall::automock)]
pub trait ChannelMembership: Send + Sync {
    /// Register a new connection with no channel memberships.
    fn connect(&self) -> ConnectionHandle;

    /// Join `channel`. Returns `false` when the connection is not registered.
    fn join(&self, connection: ConnectionId, channel: ChannelId) -> bool;

    /// Leave `channel`. Returns `false` when the connection is not registered.
    fn leave(&self, connection: ConnectionId, channel: ChannelId) -> bool;

    /// Drop the connection and every membership it holds.
    fn disconnect(&self, connection: ConnectionId);
}
