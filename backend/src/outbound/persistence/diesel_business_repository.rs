//! PostgreSQL-backed `BusinessRepository` implementation using Diesel ORM.
//!
//! A listing aggregate spans three tables: `businesses`, its subscriber rows,
//! and its reviews. Reads load the parent rows first and then hydrate
//! subscribers and reviews with one query each, so listing pages cost three
//! round trips regardless of size. Mutations that return the aggregate run in
//! a transaction so the returned state matches what was written.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{BusinessPersistenceError, BusinessRepository};
use crate::domain::{
    Business, BusinessFilter, BusinessId, BusinessPatch, NewBusiness, Review, ReviewFilter,
    ReviewId, ReviewListing, UserId,
};

use super::diesel_basic_error_mapping::{
    contains_pattern, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{
    BusinessChangeset, BusinessRow, NewBusinessRow, NewReviewRow, NewSubscriberRow, ReviewRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{business_subscribers, businesses, reviews};

/// Diesel-backed implementation of the `BusinessRepository` port.
#[derive(Clone)]
pub struct DieselBusinessRepository {
    pool: DbPool,
}

impl DieselBusinessRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> BusinessPersistenceError {
    map_basic_pool_error(error, |message| BusinessPersistenceError::connection(message))
}

fn map_diesel_error(error: diesel::result::Error) -> BusinessPersistenceError {
    map_basic_diesel_error(
        error,
        BusinessPersistenceError::query,
        BusinessPersistenceError::connection,
    )
}

/// Parent rows with their child rows, as read inside one connection.
struct ListingRows {
    parents: Vec<BusinessRow>,
    subscribers: Vec<(Uuid, Uuid)>,
    reviews: Vec<ReviewRow>,
}

impl ListingRows {
    fn into_businesses(self) -> Vec<Business> {
        let mut subscribers: HashMap<Uuid, Vec<UserId>> = HashMap::new();
        for (business_id, user_id) in self.subscribers {
            subscribers
                .entry(business_id)
                .or_default()
                .push(UserId::from_uuid(user_id));
        }
        let mut reviews: HashMap<Uuid, Vec<Review>> = HashMap::new();
        for row in self.reviews {
            reviews.entry(row.business_id).or_default().push(row_to_review(row));
        }

        self.parents
            .into_iter()
            .map(|row| Business {
                id: BusinessId::from_uuid(row.id),
                owner: UserId::from_uuid(row.owner_id),
                subscribers: subscribers.remove(&row.id).unwrap_or_default(),
                reviews: reviews.remove(&row.id).unwrap_or_default(),
                name: row.name,
                description: row.description,
                category: row.category,
                created_at: row.created_at,
                updated_at: row.updated_at,
            })
            .collect()
    }
}

fn row_to_review(row: ReviewRow) -> Review {
    Review {
        id: ReviewId::from_uuid(row.id),
        author: UserId::from_uuid(row.author_id),
        comment: row.comment,
        created_at: row.created_at,
    }
}

/// Load subscriber and review rows for `parents`, preserving parent order.
async fn hydrate(
    conn: &mut AsyncPgConnection,
    parents: Vec<BusinessRow>,
) -> Result<ListingRows, diesel::result::Error> {
    if parents.is_empty() {
        return Ok(ListingRows {
            parents,
            subscribers: Vec::new(),
            reviews: Vec::new(),
        });
    }
    let ids: Vec<Uuid> = parents.iter().map(|row| row.id).collect();

    let subscribers = business_subscribers::table
        .filter(business_subscribers::business_id.eq_any(&ids))
        .order((
            business_subscribers::business_id,
            business_subscribers::created_at.asc(),
            business_subscribers::user_id,
        ))
        .select((business_subscribers::business_id, business_subscribers::user_id))
        .load::<(Uuid, Uuid)>(conn)
        .await?;
    let reviews = reviews::table
        .filter(reviews::business_id.eq_any(&ids))
        .order((reviews::business_id, reviews::seq.asc()))
        .select(ReviewRow::as_select())
        .load(conn)
        .await?;

    Ok(ListingRows {
        parents,
        subscribers,
        reviews,
    })
}

/// Load one listing aggregate, or `None` when the parent row is missing.
async fn load_one(
    conn: &mut AsyncPgConnection,
    id: Uuid,
) -> Result<Option<Business>, diesel::result::Error> {
    let parent = businesses::table
        .find(id)
        .select(BusinessRow::as_select())
        .first(conn)
        .await
        .optional()?;
    let Some(parent) = parent else {
        return Ok(None);
    };
    let rows = hydrate(conn, vec![parent]).await?;
    Ok(rows.into_businesses().pop())
}

async fn listing_exists(
    conn: &mut AsyncPgConnection,
    id: Uuid,
) -> Result<bool, diesel::result::Error> {
    diesel::select(diesel::dsl::exists(businesses::table.find(id)))
        .get_result(conn)
        .await
}

#[async_trait]
impl BusinessRepository for DieselBusinessRepository {
    async fn list(
        &self,
        filter: &BusinessFilter,
    ) -> Result<Vec<Business>, BusinessPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = businesses::table
            .select(BusinessRow::as_select())
            .order((businesses::created_at.desc(), businesses::id.asc()))
            .into_boxed();

        if let Some(search) = filter.search.as_deref() {
            let pattern = contains_pattern(search);
            query = query.filter(
                businesses::name
                    .ilike(pattern.clone())
                    .or(businesses::description.ilike(pattern)),
            );
        }
        if let Some(category) = filter.category.as_deref() {
            query = query.filter(businesses::category.eq(category.to_owned()));
        }
        if let Some(owner) = filter.owner {
            query = query.filter(businesses::owner_id.eq(*owner.as_uuid()));
        }

        let parents = query.load(&mut conn).await.map_err(map_diesel_error)?;
        let rows = hydrate(&mut conn, parents).await.map_err(map_diesel_error)?;
        Ok(rows.into_businesses())
    }

    async fn find_by_id(
        &self,
        id: &BusinessId,
    ) -> Result<Option<Business>, BusinessPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        load_one(&mut conn, *id.as_uuid())
            .await
            .map_err(map_diesel_error)
    }

    async fn find_many(
        &self,
        ids: &[BusinessId],
    ) -> Result<Vec<Business>, BusinessPersistenceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();

        let parents = businesses::table
            .filter(businesses::id.eq_any(&uuids))
            .order((businesses::created_at.desc(), businesses::id.asc()))
            .select(BusinessRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows = hydrate(&mut conn, parents).await.map_err(map_diesel_error)?;
        Ok(rows.into_businesses())
    }

    async fn create(&self, business: &NewBusiness) -> Result<Business, BusinessPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewBusinessRow {
            id: *business.id.as_uuid(),
            owner_id: *business.owner.as_uuid(),
            name: &business.draft.name,
            description: &business.draft.description,
            category: &business.draft.category,
            created_at: business.created_at,
            updated_at: business.created_at,
        };

        let inserted = diesel::insert_into(businesses::table)
            .values(&row)
            .returning(BusinessRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let rows = ListingRows {
            parents: vec![inserted],
            subscribers: Vec::new(),
            reviews: Vec::new(),
        };
        rows.into_businesses()
            .pop()
            .ok_or_else(|| BusinessPersistenceError::query("insert returned no row"))
    }

    async fn update(
        &self,
        id: &BusinessId,
        patch: &BusinessPatch,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Business>, BusinessPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = *id.as_uuid();
        let changes = BusinessChangeset {
            name: patch.name.as_deref(),
            description: patch.description.as_deref(),
            category: patch.category.as_deref(),
            updated_at,
        };

        conn.transaction(|conn| {
            async move {
                let updated = diesel::update(businesses::table.find(id))
                    .set(&changes)
                    .execute(conn)
                    .await?;
                if updated == 0 {
                    return Ok(None);
                }
                load_one(conn, id).await
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn delete(&self, id: &BusinessId) -> Result<bool, BusinessPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        // Subscriber and review rows go with the parent via ON DELETE CASCADE.
        let deleted = diesel::delete(businesses::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn count_owned_by(&self, owner: &UserId) -> Result<u64, BusinessPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = businesses::table
            .filter(businesses::owner_id.eq(owner.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        u64::try_from(count).map_err(|_| BusinessPersistenceError::query("negative listing count"))
    }

    async fn add_subscriber(
        &self,
        id: &BusinessId,
        user: &UserId,
        subscribed_at: DateTime<Utc>,
    ) -> Result<Option<Business>, BusinessPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewSubscriberRow {
            business_id: *id.as_uuid(),
            user_id: *user.as_uuid(),
            created_at: subscribed_at,
        };

        conn.transaction(|conn| {
            async move {
                if !listing_exists(conn, row.business_id).await? {
                    return Ok(None);
                }
                diesel::insert_into(business_subscribers::table)
                    .values(&row)
                    .on_conflict_do_nothing()
                    .execute(conn)
                    .await?;
                load_one(conn, row.business_id).await
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn remove_subscriber(
        &self,
        id: &BusinessId,
        user: &UserId,
    ) -> Result<Option<Business>, BusinessPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let business_id = *id.as_uuid();
        let user_id = *user.as_uuid();

        conn.transaction(|conn| {
            async move {
                if !listing_exists(conn, business_id).await? {
                    return Ok(None);
                }
                diesel::delete(
                    business_subscribers::table
                        .filter(business_subscribers::business_id.eq(business_id))
                        .filter(business_subscribers::user_id.eq(user_id)),
                )
                .execute(conn)
                .await?;
                load_one(conn, business_id).await
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn append_review(
        &self,
        id: &BusinessId,
        review: &Review,
    ) -> Result<Option<Business>, BusinessPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewReviewRow {
            id: *review.id.as_uuid(),
            business_id: *id.as_uuid(),
            author_id: *review.author.as_uuid(),
            comment: &review.comment,
            created_at: review.created_at,
        };

        conn.transaction(|conn| {
            async move {
                if !listing_exists(conn, row.business_id).await? {
                    return Ok(None);
                }
                diesel::insert_into(reviews::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                load_one(conn, row.business_id).await
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn remove_review(
        &self,
        id: &BusinessId,
        review: &ReviewId,
    ) -> Result<bool, BusinessPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            reviews::table
                .filter(reviews::id.eq(review.as_uuid()))
                .filter(reviews::business_id.eq(id.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn list_reviews(
        &self,
        filter: &ReviewFilter,
    ) -> Result<Vec<ReviewListing>, BusinessPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = reviews::table
            .inner_join(businesses::table)
            .select((ReviewRow::as_select(), businesses::name))
            .order((reviews::created_at.desc(), reviews::seq.desc()))
            .into_boxed();

        if let Some(search) = filter.search.as_deref() {
            let pattern = contains_pattern(search);
            query = query.filter(
                reviews::comment
                    .ilike(pattern.clone())
                    .or(businesses::name.ilike(pattern)),
            );
        }

        let rows: Vec<(ReviewRow, String)> =
            query.load(&mut conn).await.map_err(map_diesel_error)?;
        Ok(rows
            .into_iter()
            .map(|(row, business_name)| ReviewListing {
                business_id: BusinessId::from_uuid(row.business_id),
                business_name,
                review: row_to_review(row),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    //! Aggregate assembly coverage; SQL behaviour shares its contract with the
    //! in-memory adapter tests.
    use super::*;
    use rstest::rstest;

    fn parent(id: Uuid, name: &str) -> BusinessRow {
        let now = Utc::now();
        BusinessRow {
            id,
            owner_id: Uuid::new_v4(),
            name: name.into(),
            description: "desc".into(),
            category: "Food".into(),
            created_at: now,
            updated_at: now,
        }
    }

    fn review(business_id: Uuid, comment: &str) -> ReviewRow {
        ReviewRow {
            id: Uuid::new_v4(),
            business_id,
            author_id: Uuid::new_v4(),
            comment: comment.into(),
            created_at: Utc::now(),
        }
    }

    #[rstest]
    fn child_rows_attach_to_their_parent_in_order() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let subscriber = Uuid::new_v4();
        let rows = ListingRows {
            parents: vec![parent(a, "A"), parent(b, "B")],
            subscribers: vec![(b, subscriber)],
            reviews: vec![review(a, "first"), review(a, "second"), review(b, "other")],
        };

        let businesses = rows.into_businesses();

        assert_eq!(businesses.len(), 2);
        assert_eq!(businesses[0].name, "A");
        let comments: Vec<_> = businesses[0]
            .reviews
            .iter()
            .map(|r| r.comment.as_str())
            .collect();
        assert_eq!(comments, ["first", "second"]);
        assert!(businesses[0].subscribers.is_empty());
        assert_eq!(businesses[1].subscribers, vec![UserId::from_uuid(subscriber)]);
        assert_eq!(businesses[1].reviews.len(), 1);
    }
}
