//! Read models returned across the API boundary.
//!
//! Stored listings hold bare user ids. Before a listing leaves the domain,
//! every id is resolved against the identity store and wrapped in a
//! [`Ref`]: `Resolved` when the user exists, `Reference` when it does not.
//! Consumers never have to guess which shape a field holds.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Business, BusinessId, Review, ReviewId, ReviewListing, UserId, UserSummary};

/// Either a bare identifier or the entity it points at.
///
/// Serialised with a `kind` tag:
/// `{"kind":"reference","id":"..."}` or `{"kind":"resolved","id":"...","name":"..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Ref<I, T> {
    Reference { id: I },
    Resolved(T),
}

impl<I, T> Ref<I, T> {
    /// Whether the reference was resolved.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// The resolved entity, if available.
    pub fn resolved(&self) -> Option<&T> {
        match self {
            Self::Reference { .. } => None,
            Self::Resolved(entity) => Some(entity),
        }
    }
}

/// Reference to a user.
pub type UserRef = Ref<UserId, UserSummary>;

impl UserRef {
    /// Identifier of the referenced user, whichever shape the reference has.
    pub fn id(&self) -> UserId {
        match self {
            Self::Reference { id } => *id,
            Self::Resolved(summary) => summary.id,
        }
    }
}

/// Lookup table from user id to summary used during resolution.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory(HashMap<UserId, UserSummary>);

impl UserDirectory {
    /// Index the given summaries by id.
    pub fn new(summaries: impl IntoIterator<Item = UserSummary>) -> Self {
        Self(
            summaries
                .into_iter()
                .map(|summary| (summary.id, summary))
                .collect(),
        )
    }

    /// Resolve an id, falling back to a bare reference.
    pub fn resolve(&self, id: UserId) -> UserRef {
        match self.0.get(&id) {
            Some(summary) => Ref::Resolved(summary.clone()),
            None => Ref::Reference { id },
        }
    }
}

/// Review as presented to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    #[schema(value_type = String)]
    pub id: ReviewId,
    #[schema(value_type = Object)]
    pub author: UserRef,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl ReviewView {
    /// Build the view, resolving the author.
    pub fn resolve(review: &Review, users: &UserDirectory) -> Self {
        Self {
            id: review.id,
            author: users.resolve(review.author),
            comment: review.comment.clone(),
            created_at: review.created_at,
        }
    }
}

/// Listing as presented to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BusinessView {
    #[schema(value_type = String)]
    pub id: BusinessId,
    pub name: String,
    pub description: String,
    pub category: String,
    #[schema(value_type = Object)]
    pub owner: UserRef,
    #[schema(value_type = Vec<Object>)]
    pub subscribers: Vec<UserRef>,
    pub reviews: Vec<ReviewView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BusinessView {
    /// Build the view, resolving owner, subscribers, and review authors.
    pub fn resolve(business: &Business, users: &UserDirectory) -> Self {
        Self {
            id: business.id,
            name: business.name.clone(),
            description: business.description.clone(),
            category: business.category.clone(),
            owner: users.resolve(business.owner),
            subscribers: business
                .subscribers
                .iter()
                .map(|id| users.resolve(*id))
                .collect(),
            reviews: business
                .reviews
                .iter()
                .map(|review| ReviewView::resolve(review, users))
                .collect(),
            created_at: business.created_at,
            updated_at: business.updated_at,
        }
    }
}

/// Review with its parent listing, for moderation screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminReviewView {
    #[serde(flatten)]
    pub review: ReviewView,
    #[schema(value_type = String)]
    pub business_id: BusinessId,
    pub business_name: String,
}

impl AdminReviewView {
    /// Build the view, resolving the author.
    pub fn resolve(listing: &ReviewListing, users: &UserDirectory) -> Self {
        Self {
            review: ReviewView::resolve(&listing.review, users),
            business_id: listing.business_id,
            business_name: listing.business_name.clone(),
        }
    }
}
