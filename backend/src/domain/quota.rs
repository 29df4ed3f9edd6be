//! Plan-based listing quota.
//!
//! Limits apply at creation time only: downgrading a plan never removes
//! listings the user already owns.
//!
//! The quota check and the insert that follows are separate store calls, so
//! two concurrent creations by the same user can both pass the check and
//! exceed the limit by one. This race is accepted.

use serde_json::json;

use crate::domain::{Error, Plan};

/// Maximum number of listings a user on `plan` may own.
#[must_use]
pub const fn listing_limit(plan: Plan) -> u64 {
    match plan {
        Plan::Standard => 1,
        Plan::Gold => 3,
        Plan::Platinum => 10,
    }
}

/// Whether a user on `plan` who already owns `owned` listings may create one more.
///
/// # Examples
/// ```
/// use listings_backend::domain::Plan;
/// use listings_backend::domain::quota::can_create_listing;
///
/// assert!(can_create_listing(Plan::Standard, 0));
/// assert!(!can_create_listing(Plan::Standard, 1));
/// assert!(can_create_listing(Plan::Gold, 2));
/// ```
#[must_use]
pub const fn can_create_listing(plan: Plan, owned: u64) -> bool {
    owned < listing_limit(plan)
}

/// Fail with `QuotaExceeded` when the plan limit is reached.
pub fn ensure_listing_quota(plan: Plan, owned: u64) -> Result<(), Error> {
    if can_create_listing(plan, owned) {
        return Ok(());
    }
    Err(Error::quota_exceeded(format!(
        "You have reached the business limit for your {plan} plan"
    ))
    .with_details(json!({
        "plan": plan.as_str(),
        "limit": listing_limit(plan),
        "owned": owned,
    })))
}
