//! Per-user handlers: saved listings and plan changes.
//!
//! ```text
//! GET  /api/users/saved-businesses
//! POST /api/users/upgrade-plan {"plan":"Gold"}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ApiResult, BusinessView, Plan};

use super::accounts::UserResponse;
use super::auth::AuthenticatedUser;
use super::envelope::{self, Envelope};
use super::error::FailureEnvelope;
use super::state::HttpState;
use super::validation::{FieldName, plan_error, require};

/// Plan change request body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpgradePlanRequest {
    #[schema(example = "Platinum")]
    pub plan: Option<String>,
}

/// Listings the caller has saved.
///
/// Nothing writes the saved set yet, so this is usually empty.
#[utoipa::path(
    get,
    path = "/api/users/saved-businesses",
    responses(
        (status = 200, description = "Saved listings", body = Envelope<Vec<BusinessView>>),
        (status = 401, description = "Unauthorised", body = FailureEnvelope)
    ),
    tags = ["users"],
    operation_id = "savedBusinesses"
)]
#[get("/users/saved-businesses")]
pub async fn saved_businesses(
    state: web::Data<HttpState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> ApiResult<HttpResponse> {
    let listings = state.listing_query.saved_businesses(&user.id).await?;
    Ok(envelope::ok(listings))
}

/// Move the caller to another plan. Existing listings are kept.
#[utoipa::path(
    post,
    path = "/api/users/upgrade-plan",
    request_body = UpgradePlanRequest,
    responses(
        (status = 200, description = "Plan changed", body = Envelope<UserResponse>),
        (status = 400, description = "Invalid plan", body = FailureEnvelope),
        (status = 401, description = "Unauthorised", body = FailureEnvelope)
    ),
    tags = ["users"],
    operation_id = "upgradePlan"
)]
#[post("/users/upgrade-plan")]
pub async fn upgrade_plan(
    state: web::Data<HttpState>,
    AuthenticatedUser(user): AuthenticatedUser,
    payload: web::Json<UpgradePlanRequest>,
) -> ApiResult<HttpResponse> {
    let raw = require(payload.into_inner().plan, FieldName::new("plan"))?;
    let plan = raw.parse::<Plan>().map_err(|_| plan_error())?;
    let updated = state.accounts.change_plan(&user.id, plan).await?;
    Ok(envelope::ok(UserResponse::from(&updated)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{TestStack, bearer, json_body};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::json;

    #[actix_web::test]
    async fn saved_businesses_start_empty() {
        let stack = TestStack::new();
        let (token, _) = stack.signup("Sam", None).await;
        let app = stack.app().await;

        let request = actix_test::TestRequest::get()
            .uri("/api/users/saved-businesses")
            .insert_header(bearer(&token))
            .to_request();
        let body = json_body(actix_test::call_service(&app, request).await).await;

        assert_eq!(body, json!({"success": true, "data": []}));
    }

    #[actix_web::test]
    async fn upgrade_changes_plan() {
        let stack = TestStack::new();
        let (token, _) = stack.signup("Sam", None).await;
        let app = stack.app().await;

        let request = actix_test::TestRequest::post()
            .uri("/api/users/upgrade-plan")
            .insert_header(bearer(&token))
            .set_json(json!({"plan": "Gold"}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["data"]["plan"], "Gold");
    }

    #[rstest]
    #[case(json!({"plan": "Diamond"}), "invalid_plan")]
    #[case(json!({"plan": "gold"}), "invalid_plan")]
    #[case(json!({}), "missing_field")]
    #[actix_web::test]
    async fn upgrade_rejects_unknown_plans(
        #[case] payload: serde_json::Value,
        #[case] code: &str,
    ) {
        let stack = TestStack::new();
        let (token, _) = stack.signup("Sam", None).await;
        let app = stack.app().await;

        let request = actix_test::TestRequest::post()
            .uri("/api/users/upgrade-plan")
            .insert_header(bearer(&token))
            .set_json(payload)
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["details"]["field"], "plan");
        assert_eq!(body["details"]["code"], code);
    }
}
