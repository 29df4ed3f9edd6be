//! Moderation handlers.
//!
//! ```text
//! GET /api/admin/reviews?search=rude
//! ```

use actix_web::{HttpResponse, get, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::{AdminReviewView, ApiResult, ReviewFilter};

use super::auth::AuthenticatedUser;
use super::envelope::{self, Envelope};
use super::error::FailureEnvelope;
use super::state::HttpState;

/// Moderation filters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ModerationQuery {
    /// Case-insensitive match on comment or business name.
    pub search: Option<String>,
}

/// Every review with its parent listing, newest first. Admin only.
#[utoipa::path(
    get,
    path = "/api/admin/reviews",
    params(ModerationQuery),
    responses(
        (status = 200, description = "Reviews", body = Envelope<Vec<AdminReviewView>>),
        (status = 401, description = "Unauthorised", body = FailureEnvelope),
        (status = 403, description = "Admin access required", body = FailureEnvelope)
    ),
    tags = ["admin"],
    operation_id = "moderationReviews"
)]
#[get("/admin/reviews")]
pub async fn moderation_reviews(
    state: web::Data<HttpState>,
    AuthenticatedUser(user): AuthenticatedUser,
    query: web::Query<ModerationQuery>,
) -> ApiResult<HttpResponse> {
    let filter = ReviewFilter::new(query.search.as_deref());
    let reviews = state.listing_query.moderation_reviews(&user, filter).await?;
    Ok(envelope::ok(reviews))
}
