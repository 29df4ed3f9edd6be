//! Business listing handlers.
//!
//! ```text
//! GET    /api/businesses?search=cafe&category=Food&onlyOwned=true
//! GET    /api/businesses/{id}
//! POST   /api/businesses {"name":"Cafe","description":"Coffee","category":"Food"}
//! PUT    /api/businesses/{id} {"name":"New name"}
//! DELETE /api/businesses/{id}
//! POST   /api/businesses/{id}/subscribe
//! POST   /api/businesses/{id}/unsubscribe
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{ApiResult, BusinessDraft, BusinessFilter, BusinessPatch, BusinessView};

use super::auth::{AuthenticatedUser, MaybeAuthenticated};
use super::envelope::{self, Envelope};
use super::error::FailureEnvelope;
use super::state::HttpState;
use super::validation::{map_business_validation_error, parse_business_id};

/// Directory filters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListBusinessesQuery {
    /// Case-insensitive match on name or description.
    pub search: Option<String>,
    /// Exact category.
    pub category: Option<String>,
    /// Only the caller's own listings. Requires a bearer token.
    pub only_owned: Option<bool>,
}

/// Listing fields. All are required on create; absent fields are left
/// unchanged on update.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BusinessRequest {
    #[schema(example = "Corner Cafe")]
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(example = "Food")]
    pub category: Option<String>,
}

impl TryFrom<BusinessRequest> for BusinessDraft {
    type Error = crate::domain::BusinessValidationError;

    fn try_from(value: BusinessRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(
            value.name.as_deref().unwrap_or_default(),
            value.description.as_deref().unwrap_or_default(),
            value.category.as_deref().unwrap_or_default(),
        )
    }
}

impl TryFrom<BusinessRequest> for BusinessPatch {
    type Error = crate::domain::BusinessValidationError;

    fn try_from(value: BusinessRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(
            value.name.as_deref(),
            value.description.as_deref(),
            value.category.as_deref(),
        )
    }
}

/// Directory listing, newest first.
#[utoipa::path(
    get,
    path = "/api/businesses",
    params(ListBusinessesQuery),
    responses(
        (status = 200, description = "Listings", body = Envelope<Vec<BusinessView>>),
        (status = 400, description = "Invalid request", body = FailureEnvelope),
        (status = 401, description = "onlyOwned without a valid token", body = FailureEnvelope),
        (status = 500, description = "Internal server error", body = FailureEnvelope)
    ),
    tags = ["businesses"],
    operation_id = "listBusinesses",
    security((), ("BearerAuth" = []))
)]
#[get("/businesses")]
pub async fn list_businesses(
    state: web::Data<HttpState>,
    caller: MaybeAuthenticated,
    query: web::Query<ListBusinessesQuery>,
) -> ApiResult<HttpResponse> {
    let query = query.into_inner();
    let owner = if query.only_owned.unwrap_or(false) {
        Some(caller.require()?.id)
    } else {
        None
    };
    let filter = BusinessFilter::new(query.search.as_deref(), query.category.as_deref(), owner);
    let listings = state.listing_query.list(filter).await?;
    Ok(envelope::ok(listings))
}

/// One listing with owner, subscribers, and reviews resolved.
#[utoipa::path(
    get,
    path = "/api/businesses/{id}",
    params(("id" = String, Path, description = "Business id")),
    responses(
        (status = 200, description = "Listing", body = Envelope<BusinessView>),
        (status = 400, description = "Malformed id", body = FailureEnvelope),
        (status = 404, description = "Business not found", body = FailureEnvelope)
    ),
    tags = ["businesses"],
    operation_id = "getBusiness",
    security([])
)]
#[get("/businesses/{id}")]
pub async fn get_business(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_business_id(&path)?;
    let listing = state.listing_query.get(&id).await?;
    Ok(envelope::ok(listing))
}

/// Create a listing owned by the caller, subject to the plan limit.
#[utoipa::path(
    post,
    path = "/api/businesses",
    request_body = BusinessRequest,
    responses(
        (status = 201, description = "Listing created", body = Envelope<BusinessView>),
        (status = 400, description = "Invalid request", body = FailureEnvelope),
        (status = 401, description = "Unauthorised", body = FailureEnvelope),
        (status = 403, description = "Plan limit reached", body = FailureEnvelope)
    ),
    tags = ["businesses"],
    operation_id = "createBusiness"
)]
#[post("/businesses")]
pub async fn create_business(
    state: web::Data<HttpState>,
    AuthenticatedUser(user): AuthenticatedUser,
    payload: web::Json<BusinessRequest>,
) -> ApiResult<HttpResponse> {
    let draft =
        BusinessDraft::try_from(payload.into_inner()).map_err(map_business_validation_error)?;
    let listing = state.listings.create(&user, draft).await?;
    Ok(envelope::created(listing))
}

/// Update listing fields. Owner only; connected subscribers are notified.
#[utoipa::path(
    put,
    path = "/api/businesses/{id}",
    params(("id" = String, Path, description = "Business id")),
    request_body = BusinessRequest,
    responses(
        (status = 200, description = "Listing updated", body = Envelope<BusinessView>),
        (status = 400, description = "Invalid request", body = FailureEnvelope),
        (status = 401, description = "Unauthorised", body = FailureEnvelope),
        (status = 403, description = "Not the owner", body = FailureEnvelope),
        (status = 404, description = "Business not found", body = FailureEnvelope)
    ),
    tags = ["businesses"],
    operation_id = "updateBusiness"
)]
#[put("/businesses/{id}")]
pub async fn update_business(
    state: web::Data<HttpState>,
    AuthenticatedUser(user): AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<BusinessRequest>,
) -> ApiResult<HttpResponse> {
    let id = parse_business_id(&path)?;
    let patch =
        BusinessPatch::try_from(payload.into_inner()).map_err(map_business_validation_error)?;
    let listing = state.listings.update(&user, &id, patch).await?;
    Ok(envelope::ok(listing))
}

/// Delete a listing and its reviews. Owner or admin.
#[utoipa::path(
    delete,
    path = "/api/businesses/{id}",
    params(("id" = String, Path, description = "Business id")),
    responses(
        (status = 200, description = "Listing deleted", body = Envelope<Option<String>>),
        (status = 401, description = "Unauthorised", body = FailureEnvelope),
        (status = 403, description = "Not the owner", body = FailureEnvelope),
        (status = 404, description = "Business not found", body = FailureEnvelope)
    ),
    tags = ["businesses"],
    operation_id = "deleteBusiness"
)]
#[delete("/businesses/{id}")]
pub async fn delete_business(
    state: web::Data<HttpState>,
    AuthenticatedUser(user): AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_business_id(&path)?;
    state.listings.delete(&user, &id).await?;
    Ok(envelope::acknowledged("Business deleted"))
}

/// Subscribe the caller to a listing they do not own.
#[utoipa::path(
    post,
    path = "/api/businesses/{id}/subscribe",
    params(("id" = String, Path, description = "Business id")),
    responses(
        (status = 200, description = "Subscribed", body = Envelope<BusinessView>),
        (status = 401, description = "Unauthorised", body = FailureEnvelope),
        (status = 403, description = "Own listing", body = FailureEnvelope),
        (status = 404, description = "Business not found", body = FailureEnvelope),
        (status = 409, description = "Already subscribed", body = FailureEnvelope)
    ),
    tags = ["businesses"],
    operation_id = "subscribeBusiness"
)]
#[post("/businesses/{id}/subscribe")]
pub async fn subscribe(
    state: web::Data<HttpState>,
    AuthenticatedUser(user): AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_business_id(&path)?;
    let listing = state.listings.subscribe(&user, &id).await?;
    Ok(Envelope::ok(listing)
        .with_message("Subscribed")
        .respond(actix_web::http::StatusCode::OK))
}

/// Remove the caller from a listing's subscribers.
#[utoipa::path(
    post,
    path = "/api/businesses/{id}/unsubscribe",
    params(("id" = String, Path, description = "Business id")),
    responses(
        (status = 200, description = "Unsubscribed", body = Envelope<BusinessView>),
        (status = 401, description = "Unauthorised", body = FailureEnvelope),
        (status = 404, description = "Business not found", body = FailureEnvelope),
        (status = 409, description = "Not subscribed", body = FailureEnvelope)
    ),
    tags = ["businesses"],
    operation_id = "unsubscribeBusiness"
)]
#[post("/businesses/{id}/unsubscribe")]
pub async fn unsubscribe(
    state: web::Data<HttpState>,
    AuthenticatedUser(user): AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_business_id(&path)?;
    let listing = state.listings.unsubscribe(&user, &id).await?;
    Ok(Envelope::ok(listing)
        .with_message("Unsubscribed")
        .respond(actix_web::http::StatusCode::OK))
}

#[cfg(test)]
#[path = "businesses_tests.rs"]
mod tests;
