//! Listing change events pushed to live channel members.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Business, BusinessId};

/// Kind of listing mutation that produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BusinessEventKind {
    Update,
    Delete,
}

impl BusinessEventKind {
    /// Event name used on the wire.
    #[must_use]
    pub const fn event_name(self) -> &'static str {
        match self {
            Self::Update => "businessUpdated",
            Self::Delete => "businessDeleted",
        }
    }
}

/// Payload delivered to every connection joined to a listing's channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BusinessEvent {
    pub kind: BusinessEventKind,
    #[schema(value_type = String)]
    pub business_id: BusinessId,
    pub business_name: String,
    pub message: String,
}

impl BusinessEvent {
    /// Event announcing that a listing's details changed.
    pub fn updated(business: &Business) -> Self {
        Self {
            kind: BusinessEventKind::Update,
            business_id: business.id,
            business_name: business.name.clone(),
            message: "Business details have been updated".to_owned(),
        }
    }

    /// Event announcing that a listing was removed.
    pub fn deleted(business: &Business) -> Self {
        Self {
            kind: BusinessEventKind::Delete,
            business_id: business.id,
            business_name: business.name.clone(),
            message: "Business has been deleted".to_owned(),
        }
    }

    /// Channel the event is published to.
    pub fn channel(&self) -> ChannelId {
        ChannelId::for_business(self.business_id)
    }
}

/// Live notification channel keyed by business id (`business:<id>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(BusinessId);

impl ChannelId {
    /// Channel carrying events for `business_id`.
    #[must_use]
    pub const fn for_business(business_id: BusinessId) -> Self {
        Self(business_id)
    }

    /// Business the channel belongs to.
    #[must_use]
    pub const fn business_id(&self) -> BusinessId {
        self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "business:{}", self.0)
    }
}

impl Serialize for ChannelId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use chrono::Utc;
    use insta::assert_json_snapshot;
    use uuid::Uuid;

    use crate::domain::UserId;

    const NIL_CHANNEL: ChannelId = ChannelId::for_business(BusinessId::from_uuid(Uuid::nil()));
    const UPDATE_EVENT: &str = BusinessEventKind::Update.event_name();

    #[test]
    fn channel_and_event_names_are_available_in_const_context() {
        assert_eq!(NIL_CHANNEL.business_id(), BusinessId::from_uuid(Uuid::nil()));
        assert_eq!(
            NIL_CHANNEL.to_string(),
            "business:00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(UPDATE_EVENT, "businessUpdated");
    }

    fn business() -> Business {
        let now = Utc::now();
        Business {
            id: BusinessId::from_uuid(Uuid::nil()),
            owner: UserId::random(),
            name: "Harbour Books".into(),
            description: "Second-hand books".into(),
            category: "Retail".into(),
            subscribers: Vec::new(),
            reviews: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn channel_ids_are_prefixed() {
        let event = BusinessEvent::updated(&business());
        assert_eq!(
            event.channel().to_string(),
            "business:00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn serialises_update_event() {
        assert_json_snapshot!(BusinessEvent::updated(&business()), @r#"
        {
          "kind": "update",
          "businessId": "00000000-0000-0000-0000-000000000000",
          "businessName": "Harbour Books",
          "message": "Business details have been updated"
        }
        "#);
    }

    #[test]
    fn serialises_delete_event() {
        let event = BusinessEvent::deleted(&business());
        assert_eq!(event.kind.event_name(), "businessDeleted");
        assert_eq!(event.message, "Business has been deleted");
    }
}
