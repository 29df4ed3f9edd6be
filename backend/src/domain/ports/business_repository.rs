//! Port abstraction for listing persistence.
//!
//! Reviews are embedded in their listing, so every review operation is
//! addressed through the parent [`BusinessId`]. Deleting a listing removes its
//! reviews with it.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Business, BusinessFilter, BusinessId, BusinessPatch, NewBusiness, Review, ReviewFilter,
    ReviewId, ReviewListing, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by listing repository adapters.
    pub enum BusinessPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => service_unavailable: "business repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => internal: "business repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BusinessRepository: Send + Sync {
    /// Listings matching `filter`, newest first.
    async fn list(&self, filter: &BusinessFilter)
    -> Result<Vec<Business>, BusinessPersistenceError>;

    /// Fetch one listing with its subscribers and reviews.
    async fn find_by_id(&self, id: &BusinessId)
    -> Result<Option<Business>, BusinessPersistenceError>;

    /// Fetch several listings; unknown ids are skipped.
    async fn find_many(&self, ids: &[BusinessId])
    -> Result<Vec<Business>, BusinessPersistenceError>;

    /// Persist a new listing with no subscribers and no reviews.
    async fn create(&self, business: &NewBusiness) -> Result<Business, BusinessPersistenceError>;

    /// Apply a field patch. Returns `None` when the listing does not exist.
    async fn update(
        &self,
        id: &BusinessId,
        patch: &BusinessPatch,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Business>, BusinessPersistenceError>;

    /// Delete a listing and its reviews. Returns `false` when nothing was deleted.
    async fn delete(&self, id: &BusinessId) -> Result<bool, BusinessPersistenceError>;

    /// Number of listings owned by `owner`.
    async fn count_owned_by(&self, owner: &UserId) -> Result<u64, BusinessPersistenceError>;

    /// Add `user` to the persisted subscriber set, stamped `subscribed_at`.
    /// Adding twice is a no-op.
    async fn add_subscriber(
        &self,
        id: &BusinessId,
        user: &UserId,
        subscribed_at: DateTime<Utc>,
    ) -> Result<Option<Business>, BusinessPersistenceError>;

    /// Remove `user` from the persisted subscriber set.
    async fn remove_subscriber(
        &self,
        id: &BusinessId,
        user: &UserId,
    ) -> Result<Option<Business>, BusinessPersistenceError>;

    /// Append a review after any existing ones.
    async fn append_review(
        &self,
        id: &BusinessId,
        review: &Review,
    ) -> Result<Option<Business>, BusinessPersistenceError>;

    /// Remove a review. Returns `false` when the review was not on the listing.
    async fn remove_review(
        &self,
        id: &BusinessId,
        review: &ReviewId,
    ) -> Result<bool, BusinessPersistenceError>;

    /// Reviews across all listings matching `filter`, newest first.
    async fn list_reviews(
        &self,
        filter: &ReviewFilter,
    ) -> Result<Vec<ReviewListing>, BusinessPersistenceError>;
}
