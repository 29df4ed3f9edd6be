//! HTTP inbound adapter exposing REST endpoints under `/api`.

pub mod accounts;
pub mod admin;
pub mod auth;
pub mod businesses;
pub mod envelope;
pub mod error;
pub mod health;
pub mod reviews;
pub mod state;
#[cfg(test)]
pub(crate) mod test_utils;
pub mod users;
pub mod validation;

use actix_web::{Scope, web};

pub use validation::{json_config, query_config};

/// The `/api` scope with every REST handler registered.
pub fn api_scope() -> Scope {
    web::scope("/api")
        .service(accounts::signup)
        .service(accounts::login)
        .service(accounts::me)
        .service(accounts::logout)
        .service(businesses::list_businesses)
        .service(businesses::create_business)
        .service(reviews::list_reviews)
        .service(reviews::add_review)
        .service(reviews::delete_review)
        .service(businesses::subscribe)
        .service(businesses::unsubscribe)
        .service(businesses::get_business)
        .service(businesses::update_business)
        .service(businesses::delete_business)
        .service(users::saved_businesses)
        .service(users::upgrade_plan)
        .service(admin::moderation_reviews)
}
