//! Review handlers nested under a listing.
//!
//! ```text
//! GET    /api/businesses/{id}/reviews
//! POST   /api/businesses/{id}/reviews {"comment":"Great coffee"}
//! DELETE /api/businesses/{id}/reviews/{reviewId}
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ApiResult, ReviewComment, ReviewView};

use super::auth::AuthenticatedUser;
use super::envelope::{self, Envelope};
use super::error::FailureEnvelope;
use super::state::HttpState;
use super::validation::{map_business_validation_error, parse_business_id, parse_review_id};

/// Review request body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct ReviewRequest {
    #[schema(example = "Great coffee")]
    pub comment: Option<String>,
}

/// Reviews of one listing in the order they were added.
#[utoipa::path(
    get,
    path = "/api/businesses/{id}/reviews",
    params(("id" = String, Path, description = "Business id")),
    responses(
        (status = 200, description = "Reviews", body = Envelope<Vec<ReviewView>>),
        (status = 400, description = "Malformed id", body = FailureEnvelope),
        (status = 404, description = "Business not found", body = FailureEnvelope)
    ),
    tags = ["reviews"],
    operation_id = "listReviews",
    security([])
)]
#[get("/businesses/{id}/reviews")]
pub async fn list_reviews(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_business_id(&path)?;
    let reviews = state.listing_query.reviews(&id).await?;
    Ok(envelope::ok(reviews))
}

/// Review a listing the caller does not own.
#[utoipa::path(
    post,
    path = "/api/businesses/{id}/reviews",
    params(("id" = String, Path, description = "Business id")),
    request_body = ReviewRequest,
    responses(
        (status = 201, description = "Review added", body = Envelope<ReviewView>),
        (status = 400, description = "Invalid request", body = FailureEnvelope),
        (status = 401, description = "Unauthorised", body = FailureEnvelope),
        (status = 403, description = "Own listing", body = FailureEnvelope),
        (status = 404, description = "Business not found", body = FailureEnvelope)
    ),
    tags = ["reviews"],
    operation_id = "addReview"
)]
#[post("/businesses/{id}/reviews")]
pub async fn add_review(
    state: web::Data<HttpState>,
    AuthenticatedUser(user): AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<ReviewRequest>,
) -> ApiResult<HttpResponse> {
    let id = parse_business_id(&path)?;
    let comment = ReviewComment::new(payload.comment.as_deref().unwrap_or_default())
        .map_err(map_business_validation_error)?;
    let review = state.listings.add_review(&user, &id, comment).await?;
    Ok(envelope::created(review))
}

/// Remove a review. Its author, the listing owner, or an admin.
#[utoipa::path(
    delete,
    path = "/api/businesses/{id}/reviews/{reviewId}",
    params(
        ("id" = String, Path, description = "Business id"),
        ("reviewId" = String, Path, description = "Review id")
    ),
    responses(
        (status = 200, description = "Review deleted", body = Envelope<Option<String>>),
        (status = 401, description = "Unauthorised", body = FailureEnvelope),
        (status = 403, description = "Not permitted", body = FailureEnvelope),
        (status = 404, description = "Business or review not found", body = FailureEnvelope)
    ),
    tags = ["reviews"],
    operation_id = "deleteReview"
)]
#[delete("/businesses/{id}/reviews/{review_id}")]
pub async fn delete_review(
    state: web::Data<HttpState>,
    AuthenticatedUser(user): AuthenticatedUser,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (business, review) = path.into_inner();
    let business = parse_business_id(&business)?;
    let review = parse_review_id(&review)?;
    state.listings.delete_review(&user, &business, &review).await?;
    Ok(envelope::acknowledged("Review deleted"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{TestStack, bearer, json_body};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use serde_json::{Value, json};

    struct Scene {
        stack: TestStack,
        owner: String,
        reviewer: String,
        business: String,
    }

    async fn scene() -> Scene {
        let stack = TestStack::new();
        let (owner, owner_user) = stack.signup("Olive", None).await;
        let (reviewer, _) = stack.signup("Rita", None).await;
        let draft = crate::domain::BusinessDraft::try_from_parts("Cafe", "Coffee", "Food")
            .expect("valid draft");
        let listing = stack
            .states
            .http
            .listings
            .create(&owner_user, draft)
            .await
            .expect("create listing");
        Scene {
            stack,
            owner,
            reviewer,
            business: listing.id.to_string(),
        }
    }

    fn post_review(business: &str, token: &str, body: Value) -> actix_http::Request {
        actix_test::TestRequest::post()
            .uri(&format!("/api/businesses/{business}/reviews"))
            .insert_header(bearer(token))
            .set_json(body)
            .to_request()
    }

    #[actix_web::test]
    async fn reviewer_adds_and_lists_in_order() {
        let scene = scene().await;
        let app = scene.stack.app().await;

        for comment in ["First", "Second"] {
            let request = post_review(&scene.business, &scene.reviewer, json!({"comment": comment}));
            let response = actix_test::call_service(&app, request).await;
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let request = actix_test::TestRequest::get()
            .uri(&format!("/api/businesses/{}/reviews", scene.business))
            .to_request();
        let body = json_body(actix_test::call_service(&app, request).await).await;
        let comments: Vec<&str> = body["data"]
            .as_array()
            .expect("reviews")
            .iter()
            .filter_map(|review| review["comment"].as_str())
            .collect();
        assert_eq!(comments, vec!["First", "Second"]);
        assert_eq!(body["data"][0]["author"]["name"], "Rita");
    }

    #[actix_web::test]
    async fn owner_cannot_review_own_listing() {
        let scene = scene().await;
        let app = scene.stack.app().await;

        let request = post_review(&scene.business, &scene.owner, json!({"comment": "Best"}));
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            json_body(response).await["message"],
            "Cannot review your own business"
        );
    }

    #[actix_web::test]
    async fn blank_comment_is_rejected() {
        let scene = scene().await;
        let app = scene.stack.app().await;

        let request = post_review(&scene.business, &scene.reviewer, json!({"comment": "   "}));
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["details"]["field"], "comment");
    }

    #[actix_web::test]
    async fn listing_owner_may_delete_a_review() {
        let scene = scene().await;
        let app = scene.stack.app().await;
        let request = post_review(&scene.business, &scene.reviewer, json!({"comment": "Meh"}));
        let body = json_body(actix_test::call_service(&app, request).await).await;
        let review = body["data"]["id"].as_str().expect("review id").to_owned();

        let request = actix_test::TestRequest::delete()
            .uri(&format!("/api/businesses/{}/reviews/{review}", scene.business))
            .insert_header(bearer(&scene.owner))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["message"], "Review deleted");
    }

    #[actix_web::test]
    async fn unknown_review_is_not_found() {
        let scene = scene().await;
        let app = scene.stack.app().await;

        let request = actix_test::TestRequest::delete()
            .uri(&format!(
                "/api/businesses/{}/reviews/3fa85f64-5717-4562-b3fc-2c963f66afa6",
                scene.business
            ))
            .insert_header(bearer(&scene.reviewer))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["message"], "Review not found");
    }
}
