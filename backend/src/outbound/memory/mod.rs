//! In-process stores used when no database is configured.
//!
//! State is lost on restart. The adapters honour the same port contracts as
//! the Diesel ones (ordering, cascade on delete, duplicate detection) so the
//! services behave identically over either.

mod business_repository;
mod user_repository;

pub use business_repository::InMemoryBusinessRepository;
pub use user_repository::InMemoryUserRepository;
