//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the user and listing repository ports backed
//! by PostgreSQL through `diesel-async` and `bb8` pooling.
//!
//! - Repository implementations only translate between Diesel rows and domain
//!   types. No access or quota rules live here.
//! - Row structs (`models.rs`) and table definitions (`schema.rs`) never leave
//!   this module.
//! - Every database failure is mapped to the port's own error enum.
//!
//! # Example
//!
//! ```ignore
//! use listings_backend::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/listings")).await?;
//! let users = DieselUserRepository::new(pool);
//! ```

mod diesel_basic_error_mapping;
mod diesel_business_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_business_repository::DieselBusinessRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
