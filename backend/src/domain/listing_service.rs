//! Listing use-cases.
//!
//! Mutations run in a fixed order: load the listing, [`authorize`], check the
//! plan quota (create only), write through the [`BusinessRepository`], and
//! finally fan out an event through the [`NotificationPublisher`]. Fan-out is
//! best-effort and runs after the write has committed, so it can never undo
//! a mutation.
//!
//! Reads resolve owner, subscriber, and author ids into [`UserRef`]s before
//! returning.
//!
//! [`UserRef`]: crate::domain::UserRef

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info};

use crate::domain::access::{Action, Actor, Resource, authorize};
use crate::domain::ports::{
    BusinessRepository, ListingCommand, ListingQuery, NotificationPublisher, UserRepository,
};
use crate::domain::quota::ensure_listing_quota;
use crate::domain::{
    AdminReviewView, Business, BusinessDraft, BusinessEvent, BusinessFilter, BusinessId,
    BusinessPatch, BusinessView, Error, NewBusiness, Review, ReviewComment, ReviewFilter,
    ReviewId, ReviewView, User, UserDirectory, UserId,
};

const BUSINESS_NOT_FOUND: &str = "Business not found";
const REVIEW_NOT_FOUND: &str = "Review not found";

/// Listing service implementing the listing driving ports.
#[derive(Clone)]
pub struct ListingService<B, U, N> {
    businesses: Arc<B>,
    users: Arc<U>,
    notifications: Arc<N>,
    clock: Arc<dyn Clock>,
}

impl<B, U, N> ListingService<B, U, N> {
    /// Create a service over the listing store, the user store used for
    /// reference resolution, and the notification publisher.
    pub fn new(
        businesses: Arc<B>,
        users: Arc<U>,
        notifications: Arc<N>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            businesses,
            users,
            notifications,
            clock,
        }
    }
}

impl<B, U, N> ListingService<B, U, N>
where
    B: BusinessRepository,
    U: UserRepository,
    N: NotificationPublisher,
{
    async fn load(&self, id: &BusinessId) -> Result<Business, Error> {
        self.businesses
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(BUSINESS_NOT_FOUND))
    }

    async fn directory(&self, ids: Vec<UserId>) -> Result<UserDirectory, Error> {
        let mut ids = ids;
        ids.sort();
        ids.dedup();
        if ids.is_empty() {
            return Ok(UserDirectory::default());
        }
        Ok(UserDirectory::new(self.users.find_summaries(&ids).await?))
    }

    async fn views(&self, businesses: &[Business]) -> Result<Vec<BusinessView>, Error> {
        let ids = businesses
            .iter()
            .flat_map(Business::referenced_users)
            .collect();
        let users = self.directory(ids).await?;
        Ok(businesses
            .iter()
            .map(|business| BusinessView::resolve(business, &users))
            .collect())
    }

    async fn view(&self, business: &Business) -> Result<BusinessView, Error> {
        let users = self.directory(business.referenced_users()).await?;
        Ok(BusinessView::resolve(business, &users))
    }

    fn fan_out(&self, event: &BusinessEvent) {
        let delivered = self.notifications.publish(event);
        debug!(
            channel = %event.channel(),
            kind = event.kind.event_name(),
            delivered,
            "business event published"
        );
    }
}

#[async_trait]
impl<B, U, N> ListingCommand for ListingService<B, U, N>
where
    B: BusinessRepository,
    U: UserRepository,
    N: NotificationPublisher,
{
    async fn create(&self, actor: &User, draft: BusinessDraft) -> Result<BusinessView, Error> {
        authorize(&Actor::from(actor), Action::Create, Resource::Directory)?;

        // Not atomic with the insert below; concurrent creations may overshoot by one.
        let owned = self.businesses.count_owned_by(&actor.id).await?;
        ensure_listing_quota(actor.plan, owned)?;

        let new_business = NewBusiness {
            id: BusinessId::random(),
            owner: actor.id,
            draft,
            created_at: self.clock.utc(),
        };
        let business = self.businesses.create(&new_business).await?;
        info!(business_id = %business.id, owner = %actor.id, "business created");
        self.view(&business).await
    }

    async fn update(
        &self,
        actor: &User,
        id: &BusinessId,
        patch: BusinessPatch,
    ) -> Result<BusinessView, Error> {
        let business = self.load(id).await?;
        authorize(&Actor::from(actor), Action::Update, Resource::Business(&business))?;

        let updated = self
            .businesses
            .update(id, &patch, self.clock.utc())
            .await?
            .ok_or_else(|| Error::not_found(BUSINESS_NOT_FOUND))?;
        self.fan_out(&BusinessEvent::updated(&updated));
        self.view(&updated).await
    }

    async fn delete(&self, actor: &User, id: &BusinessId) -> Result<(), Error> {
        let business = self.load(id).await?;
        authorize(&Actor::from(actor), Action::Delete, Resource::Business(&business))?;

        if !self.businesses.delete(id).await? {
            return Err(Error::not_found(BUSINESS_NOT_FOUND));
        }
        info!(business_id = %id, actor = %actor.id, "business deleted");
        self.fan_out(&BusinessEvent::deleted(&business));
        Ok(())
    }

    async fn subscribe(&self, actor: &User, id: &BusinessId) -> Result<BusinessView, Error> {
        let business = self.load(id).await?;
        authorize(&Actor::from(actor), Action::Subscribe, Resource::Business(&business))?;

        let updated = self
            .businesses
            .add_subscriber(id, &actor.id, self.clock.utc())
            .await?
            .ok_or_else(|| Error::not_found(BUSINESS_NOT_FOUND))?;
        self.view(&updated).await
    }

    async fn unsubscribe(&self, actor: &User, id: &BusinessId) -> Result<BusinessView, Error> {
        let business = self.load(id).await?;
        authorize(&Actor::from(actor), Action::Unsubscribe, Resource::Business(&business))?;

        let updated = self
            .businesses
            .remove_subscriber(id, &actor.id)
            .await?
            .ok_or_else(|| Error::not_found(BUSINESS_NOT_FOUND))?;
        self.view(&updated).await
    }

    async fn add_review(
        &self,
        actor: &User,
        id: &BusinessId,
        comment: ReviewComment,
    ) -> Result<ReviewView, Error> {
        let business = self.load(id).await?;
        authorize(&Actor::from(actor), Action::ReviewCreate, Resource::Business(&business))?;

        let review = Review {
            id: ReviewId::random(),
            author: actor.id,
            comment: comment.into(),
            created_at: self.clock.utc(),
        };
        self.businesses
            .append_review(id, &review)
            .await?
            .ok_or_else(|| Error::not_found(BUSINESS_NOT_FOUND))?;
        Ok(ReviewView::resolve(
            &review,
            &UserDirectory::new([actor.summary()]),
        ))
    }

    async fn delete_review(
        &self,
        actor: &User,
        id: &BusinessId,
        review_id: &ReviewId,
    ) -> Result<(), Error> {
        let business = self.load(id).await?;
        let review = business
            .review(review_id)
            .ok_or_else(|| Error::not_found(REVIEW_NOT_FOUND))?;
        authorize(
            &Actor::from(actor),
            Action::ReviewDelete,
            Resource::Review {
                business: &business,
                review,
            },
        )?;

        if !self.businesses.remove_review(id, review_id).await? {
            return Err(Error::not_found(REVIEW_NOT_FOUND));
        }
        Ok(())
    }
}

#[async_trait]
impl<B, U, N> ListingQuery for ListingService<B, U, N>
where
    B: BusinessRepository,
    U: UserRepository,
    N: NotificationPublisher,
{
    async fn list(&self, filter: BusinessFilter) -> Result<Vec<BusinessView>, Error> {
        let businesses = self.businesses.list(&filter).await?;
        self.views(&businesses).await
    }

    async fn get(&self, id: &BusinessId) -> Result<BusinessView, Error> {
        let business = self.load(id).await?;
        self.view(&business).await
    }

    async fn reviews(&self, id: &BusinessId) -> Result<Vec<ReviewView>, Error> {
        let business = self.load(id).await?;
        let users = self
            .directory(business.reviews.iter().map(|review| review.author).collect())
            .await?;
        Ok(business
            .reviews
            .iter()
            .map(|review| ReviewView::resolve(review, &users))
            .collect())
    }

    async fn saved_businesses(&self, user: &UserId) -> Result<Vec<BusinessView>, Error> {
        let saved = self
            .users
            .find_by_id(user)
            .await?
            .ok_or_else(|| Error::not_found("User not found"))?
            .saved_businesses;
        if saved.is_empty() {
            return Ok(Vec::new());
        }
        let businesses = self.businesses.find_many(&saved).await?;
        self.views(&businesses).await
    }

    async fn moderation_reviews(
        &self,
        actor: &User,
        filter: ReviewFilter,
    ) -> Result<Vec<AdminReviewView>, Error> {
        authorize(&Actor::from(actor), Action::Moderate, Resource::Directory)?;

        let listings = self.businesses.list_reviews(&filter).await?;
        let users = self
            .directory(listings.iter().map(|listing| listing.review.author).collect())
            .await?;
        Ok(listings
            .iter()
            .map(|listing| AdminReviewView::resolve(listing, &users))
            .collect())
    }
}

#[cfg(test)]
#[path = "listing_service_tests.rs"]
mod tests;
