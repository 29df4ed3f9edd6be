//! Driving port for listing and review mutations.
//!
//! Every method takes the authenticated [`User`] performing the action. The
//! implementation applies access control, the plan quota (on create), the
//! store write, and the notification fan-out, in that order.

use async_trait::async_trait;

use crate::domain::{
    BusinessDraft, BusinessId, BusinessPatch, BusinessView, Error, ReviewComment, ReviewId,
    ReviewView, User,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingCommand: Send + Sync {
    /// Create a listing owned by `actor`.
    ///
    /// # Errors
    ///
    /// `QuotaExceeded` when the actor's plan limit is reached.
    async fn create(&self, actor: &User, draft: BusinessDraft) -> Result<BusinessView, Error>;

    /// Update listing fields. Owner only; fans out an `update` event.
    async fn update(
        &self,
        actor: &User,
        id: &BusinessId,
        patch: BusinessPatch,
    ) -> Result<BusinessView, Error>;

    /// Delete a listing and its reviews. Owner or admin; fans out a `delete` event.
    async fn delete(&self, actor: &User, id: &BusinessId) -> Result<(), Error>;

    /// Add `actor` to the persisted subscriber set.
    async fn subscribe(&self, actor: &User, id: &BusinessId) -> Result<BusinessView, Error>;

    /// Remove `actor` from the persisted subscriber set.
    async fn unsubscribe(&self, actor: &User, id: &BusinessId) -> Result<BusinessView, Error>;

    /// Append a review authored by `actor`.
    async fn add_review(
        &self,
        actor: &User,
        id: &BusinessId,
        comment: ReviewComment,
    ) -> Result<ReviewView, Error>;

    /// Remove a review. Author, listing owner, or admin.
    async fn delete_review(
        &self,
        actor: &User,
        id: &BusinessId,
        review: &ReviewId,
    ) -> Result<(), Error>;
}
