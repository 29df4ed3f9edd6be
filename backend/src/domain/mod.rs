//! Domain primitives, rules, and services.
//!
//! Purpose: define the listing directory's entities and the rules that govern
//! them, independent of HTTP, WebSocket, or storage concerns.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure taxonomy.
//! - User, Business, Review and their validated newtypes.
//! - [`access`]: pure authorization decisions.
//! - [`quota`]: plan-based listing limits.
//! - BusinessEvent / ChannelId: live notification payloads.
//! - [`views`]: read models with explicit reference resolution.
//! - [`ports`]: driven and driving port traits.
//! - IdentityStore, AccountService, ListingService: use-case services.

pub mod access;
mod account_service;
mod auth;
mod business;
pub mod error;
mod identity_store;
mod listing_service;
mod notifications;
pub mod ports;
pub mod quota;
mod trace_id;
mod user;
pub mod views;

pub use self::account_service::AccountService;
pub use self::auth::{
    IssuedToken, LoginCredentials, LoginValidationError, NewAccount, PASSWORD_MIN, Password,
    SignupValidationError, UserUpdate,
};
pub use self::business::{
    BUSINESS_NAME_MAX, Business, BusinessDraft, BusinessFilter, BusinessId, BusinessPatch,
    BusinessValidationError, NewBusiness, REVIEW_COMMENT_MAX, Review, ReviewComment, ReviewFilter,
    ReviewId, ReviewListing, contains_ignore_case,
};
pub use self::error::{Error, ErrorCode};
pub use self::identity_store::IdentityStore;
pub use self::listing_service::ListingService;
pub use self::notifications::{BusinessEvent, BusinessEventKind, ChannelId};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    Email, PasswordHash, Plan, PlanParseError, Role, RoleParseError, USER_NAME_MAX, User, UserId,
    UserName, UserSummary, UserValidationError,
};
pub use self::views::{AdminReviewView, BusinessView, Ref, ReviewView, UserDirectory, UserRef};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use listings_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
