//! Explicit connection registry backing live notification fan-out.
//!
//! The registry owns two maps: connection to its queue and joined channels,
//! and channel to its member connections. Both sit behind one mutex so they
//! never disagree. Nothing here is global; the server builds one registry and
//! shares it through application state.
//!
//! Delivery uses bounded queues and `try_send`. A full or closed queue drops
//! that event for that connection and logs a warning; the publisher carries
//! on with the remaining members.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use crate::domain::ports::{
    ChannelMembership, ConnectionHandle, ConnectionId, NotificationPublisher,
};
use crate::domain::{BusinessEvent, ChannelId};

/// Events buffered per connection before new ones are dropped.
pub const DEFAULT_QUEUE_CAPACITY: usize = 32;

#[derive(Debug)]
struct Connection {
    sender: mpsc::Sender<BusinessEvent>,
    channels: BTreeSet<ChannelId>,
}

#[derive(Debug, Default)]
struct Memberships {
    connections: HashMap<ConnectionId, Connection>,
    channels: HashMap<ChannelId, BTreeSet<ConnectionId>>,
}

/// In-process registry of live connections and their channel memberships.
#[derive(Debug)]
pub struct ChannelRegistry {
    state: Mutex<Memberships>,
    next_id: AtomicU64,
    capacity: usize,
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }
}

impl ChannelRegistry {
    /// Create a registry with the default per-connection queue capacity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry whose connections buffer up to `capacity` events.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: Mutex::new(Memberships::default()),
            next_id: AtomicU64::new(1),
            capacity: capacity.max(1),
        }
    }

    fn state(&self) -> MutexGuard<'_, Memberships> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of registered connections.
    pub fn connection_count(&self) -> usize {
        self.state().connections.len()
    }

    /// Number of connections joined to `channel`.
    pub fn member_count(&self, channel: ChannelId) -> usize {
        self.state().channels.get(&channel).map_or(0, BTreeSet::len)
    }
}

impl ChannelMembership for ChannelRegistry {
    fn connect(&self) -> ConnectionHandle {
        let id = ConnectionId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (sender, events) = mpsc::channel(self.capacity);
        self.state().connections.insert(
            id,
            Connection {
                sender,
                channels: BTreeSet::new(),
            },
        );
        debug!(connection = %id, "connection registered");
        ConnectionHandle { id, events }
    }

    fn join(&self, connection: ConnectionId, channel: ChannelId) -> bool {
        let mut state = self.state();
        let Some(entry) = state.connections.get_mut(&connection) else {
            return false;
        };
        entry.channels.insert(channel);
        state.channels.entry(channel).or_default().insert(connection);
        debug!(connection = %connection, channel = %channel, "joined channel");
        true
    }

    fn leave(&self, connection: ConnectionId, channel: ChannelId) -> bool {
        let mut state = self.state();
        let Some(entry) = state.connections.get_mut(&connection) else {
            return false;
        };
        entry.channels.remove(&channel);
        if let Some(members) = state.channels.get_mut(&channel) {
            members.remove(&connection);
            if members.is_empty() {
                state.channels.remove(&channel);
            }
        }
        debug!(connection = %connection, channel = %channel, "left channel");
        true
    }

    fn disconnect(&self, connection: ConnectionId) {
        let mut state = self.state();
        let Some(entry) = state.connections.remove(&connection) else {
            return;
        };
        for channel in entry.channels {
            if let Some(members) = state.channels.get_mut(&channel) {
                members.remove(&connection);
                if members.is_empty() {
                    state.channels.remove(&channel);
                }
            }
        }
        debug!(connection = %connection, "connection removed");
    }
}

impl NotificationPublisher for ChannelRegistry {
    fn publish(&self, event: &BusinessEvent) -> usize {
        let channel = event.channel();
        let state = self.state();
        let Some(members) = state.channels.get(&channel) else {
            return 0;
        };

        let mut delivered = 0;
        for connection in members {
            let Some(entry) = state.connections.get(connection) else {
                continue;
            };
            match entry.sender.try_send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(connection = %connection, channel = %channel, "event dropped: queue full");
                }
                Err(TrySendError::Closed(_)) => {
                    warn!(connection = %connection, channel = %channel, "event dropped: connection closed");
                }
            }
        }
        delivered
    }
}
