//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Rows are converted through the validated domain constructors so a corrupt
//! row surfaces as a query error instead of an invalid `User`.

use std::str::FromStr;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{
    BusinessId, Email, PasswordHash, Plan, Role, User, UserId, UserName, UserSummary,
};

use super::diesel_basic_error_mapping::{
    is_unique_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{NewUserRow, UserChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{saved_businesses, users};

const EMAIL_UNIQUE_CONSTRAINT: &str = "users_email_key";

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Attach saved listing ids to a fetched row.
async fn load_user(
    row: Option<UserRow>,
    conn: &mut AsyncPgConnection,
) -> Result<Option<User>, UserPersistenceError> {
    let Some(row) = row else {
        return Ok(None);
    };
    let saved: Vec<Uuid> = saved_businesses::table
        .filter(saved_businesses::user_id.eq(row.id))
        .order((saved_businesses::created_at.asc(), saved_businesses::business_id))
        .select(saved_businesses::business_id)
        .load(conn)
        .await
        .map_err(map_diesel_error)?;
    row_to_user(row, saved).map(Some)
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, |message| UserPersistenceError::connection(message))
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

fn corrupt(row: &UserRow, detail: impl std::fmt::Display) -> UserPersistenceError {
    UserPersistenceError::query(format!("stored user {} is invalid: {detail}", row.id))
}

/// Convert a database row and its saved listing ids to a domain `User`.
fn row_to_user(row: UserRow, saved: Vec<Uuid>) -> Result<User, UserPersistenceError> {
    let name = UserName::new(&row.name).map_err(|err| corrupt(&row, err))?;
    let email = Email::new(&row.email).map_err(|err| corrupt(&row, err))?;
    let plan = Plan::from_str(&row.plan).map_err(|err| corrupt(&row, err))?;
    let role = Role::from_str(&row.role).map_err(|err| corrupt(&row, err))?;

    Ok(User {
        id: UserId::from_uuid(row.id),
        name,
        email,
        password_hash: PasswordHash::from_encoded(row.password_hash),
        plan,
        role,
        saved_businesses: saved.into_iter().map(BusinessId::from_uuid).collect(),
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserRow {
            id: *user.id.as_uuid(),
            name: user.name.as_ref(),
            email: user.email.as_ref(),
            password_hash: user.password_hash.as_str(),
            plan: user.plan.as_str(),
            role: user.role.as_str(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        };

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| {
                if is_unique_violation(&err, EMAIL_UNIQUE_CONSTRAINT) {
                    UserPersistenceError::DuplicateEmail
                } else {
                    map_diesel_error(err)
                }
            })
    }

    async fn update(&self, user: &User) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = UserChangeset {
            name: user.name.as_ref(),
            password_hash: user.password_hash.as_str(),
            plan: user.plan.as_str(),
            role: user.role.as_str(),
            updated_at: user.updated_at,
        };

        let updated = diesel::update(users::table.find(user.id.as_uuid()))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        load_user(row, &mut conn).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        load_user(row, &mut conn).await
    }

    async fn find_summaries(
        &self,
        ids: &[UserId],
    ) -> Result<Vec<UserSummary>, UserPersistenceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();

        let rows: Vec<(Uuid, String)> = users::table
            .filter(users::id.eq_any(&uuids))
            .select((users::id, users::name))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| UserSummary {
                id: UserId::from_uuid(id),
                name,
            })
            .collect())
    }
}
