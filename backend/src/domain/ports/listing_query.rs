//! Driving port for listing reads.
//!
//! Results are read models with owner, subscriber, and author references
//! already resolved.

use async_trait::async_trait;

use crate::domain::{
    AdminReviewView, BusinessFilter, BusinessId, BusinessView, Error, ReviewFilter, ReviewView,
    User, UserId,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingQuery: Send + Sync {
    /// Listings matching `filter`, newest first.
    async fn list(&self, filter: BusinessFilter) -> Result<Vec<BusinessView>, Error>;

    /// One listing. `NotFound` when it does not exist.
    async fn get(&self, id: &BusinessId) -> Result<BusinessView, Error>;

    /// Reviews of one listing in insertion order.
    async fn reviews(&self, id: &BusinessId) -> Result<Vec<ReviewView>, Error>;

    /// Listings the user has saved. Ids that no longer resolve are skipped.
    async fn saved_businesses(&self, user: &UserId) -> Result<Vec<BusinessView>, Error>;

    /// Reviews across all listings for moderation. Admin only.
    async fn moderation_reviews(
        &self,
        actor: &User,
        filter: ReviewFilter,
    ) -> Result<Vec<AdminReviewView>, Error>;
}
