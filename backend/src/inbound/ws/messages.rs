//! Wire-level message definitions for the WebSocket adapter.
//!
//! Every frame is a JSON object tagged by `type`. Listing events are wrapped
//! as `businessUpdated` or `businessDeleted` with the event under `data`.

use serde::{Deserialize, Serialize};

use crate::domain::{BusinessEvent, BusinessEventKind, ChannelId, ErrorCode};

/// Frames sent by the client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Join the channel of one listing.
    Subscribe {
        #[serde(rename = "businessId")]
        business_id: String,
    },
    /// Leave the channel of one listing.
    Unsubscribe {
        #[serde(rename = "businessId")]
        business_id: String,
    },
}

/// Frames sent by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    Subscribed { channel: ChannelId },
    Unsubscribed { channel: ChannelId },
    BusinessUpdated { data: BusinessEvent },
    BusinessDeleted { data: BusinessEvent },
    Error { code: ErrorCode, message: String },
}

impl ServerMessage {
    /// Error frame for a request the server could not act on.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::Error {
            code: ErrorCode::InvalidRequest,
            message: message.into(),
        }
    }
}

impl From<BusinessEvent> for ServerMessage {
    fn from(event: BusinessEvent) -> Self {
        match event.kind {
            BusinessEventKind::Update => Self::BusinessUpdated { data: event },
            BusinessEventKind::Delete => Self::BusinessDeleted { data: event },
        }
    }
}
