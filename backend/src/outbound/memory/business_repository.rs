//! In-memory `BusinessRepository` with embedded reviews.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{BusinessPersistenceError, BusinessRepository};
use crate::domain::{
    Business, BusinessFilter, BusinessId, BusinessPatch, NewBusiness, Review, ReviewFilter,
    ReviewId, ReviewListing, UserId,
};

/// Listings held in a mutex-guarded map keyed by id.
#[derive(Debug, Default)]
pub struct InMemoryBusinessRepository {
    businesses: Mutex<HashMap<BusinessId, Business>>,
}

impl InMemoryBusinessRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn businesses(&self) -> MutexGuard<'_, HashMap<BusinessId, Business>> {
        self.businesses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn modify<F>(&self, id: &BusinessId, change: F) -> Option<Business>
    where
        F: FnOnce(&mut Business),
    {
        let mut businesses = self.businesses();
        let business = businesses.get_mut(id)?;
        change(business);
        Some(business.clone())
    }
}

fn newest_first(a: &Business, b: &Business) -> std::cmp::Ordering {
    b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl BusinessRepository for InMemoryBusinessRepository {
    async fn list(
        &self,
        filter: &BusinessFilter,
    ) -> Result<Vec<Business>, BusinessPersistenceError> {
        let mut matching: Vec<Business> = self
            .businesses()
            .values()
            .filter(|business| filter.matches(business))
            .cloned()
            .collect();
        matching.sort_by(newest_first);
        Ok(matching)
    }

    async fn find_by_id(
        &self,
        id: &BusinessId,
    ) -> Result<Option<Business>, BusinessPersistenceError> {
        Ok(self.businesses().get(id).cloned())
    }

    async fn find_many(
        &self,
        ids: &[BusinessId],
    ) -> Result<Vec<Business>, BusinessPersistenceError> {
        let businesses = self.businesses();
        Ok(ids
            .iter()
            .filter_map(|id| businesses.get(id).cloned())
            .collect())
    }

    async fn create(&self, business: &NewBusiness) -> Result<Business, BusinessPersistenceError> {
        let created = Business {
            id: business.id,
            owner: business.owner,
            name: business.draft.name.clone(),
            description: business.draft.description.clone(),
            category: business.draft.category.clone(),
            subscribers: Vec::new(),
            reviews: Vec::new(),
            created_at: business.created_at,
            updated_at: business.created_at,
        };
        self.businesses().insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        id: &BusinessId,
        patch: &BusinessPatch,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Business>, BusinessPersistenceError> {
        Ok(self.modify(id, |business| patch.apply_to(business, updated_at)))
    }

    async fn delete(&self, id: &BusinessId) -> Result<bool, BusinessPersistenceError> {
        Ok(self.businesses().remove(id).is_some())
    }

    async fn count_owned_by(&self, owner: &UserId) -> Result<u64, BusinessPersistenceError> {
        let owned = self
            .businesses()
            .values()
            .filter(|business| business.is_owned_by(owner))
            .count();
        u64::try_from(owned).map_err(|err| BusinessPersistenceError::query(err.to_string()))
    }

    async fn add_subscriber(
        &self,
        id: &BusinessId,
        user: &UserId,
        _subscribed_at: DateTime<Utc>,
    ) -> Result<Option<Business>, BusinessPersistenceError> {
        Ok(self.modify(id, |business| {
            if !business.has_subscriber(user) {
                business.subscribers.push(*user);
            }
        }))
    }

    async fn remove_subscriber(
        &self,
        id: &BusinessId,
        user: &UserId,
    ) -> Result<Option<Business>, BusinessPersistenceError> {
        Ok(self.modify(id, |business| {
            business.subscribers.retain(|subscriber| subscriber != user);
        }))
    }

    async fn append_review(
        &self,
        id: &BusinessId,
        review: &Review,
    ) -> Result<Option<Business>, BusinessPersistenceError> {
        Ok(self.modify(id, |business| business.reviews.push(review.clone())))
    }

    async fn remove_review(
        &self,
        id: &BusinessId,
        review: &ReviewId,
    ) -> Result<bool, BusinessPersistenceError> {
        let mut businesses = self.businesses();
        let Some(business) = businesses.get_mut(id) else {
            return Ok(false);
        };
        let before = business.reviews.len();
        business.reviews.retain(|existing| existing.id != *review);
        Ok(business.reviews.len() < before)
    }

    async fn list_reviews(
        &self,
        filter: &ReviewFilter,
    ) -> Result<Vec<ReviewListing>, BusinessPersistenceError> {
        let mut listings: Vec<ReviewListing> = self
            .businesses()
            .values()
            .flat_map(|business| {
                business
                    .reviews
                    .iter()
                    .filter(|review| filter.matches(review, &business.name))
                    .map(|review| ReviewListing {
                        business_id: business.id,
                        business_name: business.name.clone(),
                        review: review.clone(),
                    })
            })
            .collect();
        listings.sort_by(|a, b| b.review.created_at.cmp(&a.review.created_at));
        Ok(listings)
    }
}
