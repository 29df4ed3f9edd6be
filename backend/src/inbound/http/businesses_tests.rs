//! Handler tests for the business listing endpoints.

use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

use crate::inbound::http::test_utils::{TestStack, bearer, json_body};

fn create_request(token: &str, name: &str) -> Request {
    actix_test::TestRequest::post()
        .uri("/api/businesses")
        .insert_header(bearer(token))
        .set_json(json!({"name": name, "description": "Coffee and cake", "category": "Food"}))
        .to_request()
}

async fn create(
    app: &impl Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
    token: &str,
    name: &str,
) -> Value {
    let response = actix_test::call_service(app, create_request(token, name)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response).await["data"].clone()
}

fn id_of(listing: &Value) -> String {
    listing["id"].as_str().expect("listing id").to_owned()
}

#[actix_web::test]
async fn create_resolves_owner_and_starts_empty() {
    let stack = TestStack::new();
    let (token, owner) = stack.signup("Olive", None).await;
    let app = stack.app().await;

    let listing = create(&app, &token, "Corner Cafe").await;

    assert_eq!(listing["name"], "Corner Cafe");
    assert_eq!(
        listing["owner"],
        json!({"kind": "resolved", "id": owner.id.to_string(), "name": "Olive"})
    );
    assert_eq!(listing["subscribers"], json!([]));
    assert_eq!(listing["reviews"], json!([]));
}

#[actix_web::test]
async fn standard_plan_allows_a_single_listing() {
    let stack = TestStack::new();
    let (token, _) = stack.signup("Olive", None).await;
    let app = stack.app().await;
    create(&app, &token, "First").await;

    let response = actix_test::call_service(&app, create_request(&token, "Second")).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = json_body(response).await;
    assert_eq!(body["code"], "quota_exceeded");
    assert_eq!(
        body["message"],
        "You have reached the business limit for your Standard plan"
    );
}

#[actix_web::test]
async fn create_without_token_is_unauthorized() {
    let stack = TestStack::new();
    let app = stack.app().await;

    let request = actix_test::TestRequest::post()
        .uri("/api/businesses")
        .set_json(json!({"name": "Cafe", "description": "Coffee", "category": "Food"}))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn create_rejects_missing_name() {
    let stack = TestStack::new();
    let (token, _) = stack.signup("Olive", None).await;
    let app = stack.app().await;

    let request = actix_test::TestRequest::post()
        .uri("/api/businesses")
        .insert_header(bearer(&token))
        .set_json(json!({"description": "Coffee", "category": "Food"}))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["details"]["field"], "name");
}

#[actix_web::test]
async fn only_owned_requires_a_token_and_filters_by_owner() {
    let stack = TestStack::new();
    let (olive, _) = stack.signup("Olive", None).await;
    let (peter, _) = stack.signup("Peter", None).await;
    let app = stack.app().await;
    create(&app, &olive, "Olive's").await;
    create(&app, &peter, "Peter's").await;

    let anonymous = actix_test::TestRequest::get()
        .uri("/api/businesses?onlyOwned=true")
        .to_request();
    let response = actix_test::call_service(&app, anonymous).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let owned = actix_test::TestRequest::get()
        .uri("/api/businesses?onlyOwned=true")
        .insert_header(bearer(&olive))
        .to_request();
    let body = json_body(actix_test::call_service(&app, owned).await).await;
    let names: Vec<&str> = body["data"]
        .as_array()
        .expect("list")
        .iter()
        .filter_map(|listing| listing["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Olive's"]);

    let everything = actix_test::TestRequest::get()
        .uri("/api/businesses")
        .to_request();
    let body = json_body(actix_test::call_service(&app, everything).await).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
}

#[rstest]
#[case("garbage.token.value")]
#[case("eyJhbGciOiJIUzI1NiJ9.e30.c2lnbmF0dXJl")]
#[actix_web::test]
async fn public_listing_ignores_an_unverifiable_token(#[case] token: &str) {
    let stack = TestStack::new();
    let (owner, _) = stack.signup("Olive", None).await;
    let app = stack.app().await;
    create(&app, &owner, "Corner Cafe").await;

    let request = actix_test::TestRequest::get()
        .uri("/api/businesses")
        .insert_header(bearer(token))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
}

#[actix_web::test]
async fn only_owned_with_an_unverifiable_token_reports_the_reason() {
    let stack = TestStack::new();
    let app = stack.app().await;

    let request = actix_test::TestRequest::get()
        .uri("/api/businesses?onlyOwned=true")
        .insert_header(bearer("garbage.token.value"))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["details"]["reason"], "token_invalid");
}

#[actix_web::test]
async fn search_matches_name_case_insensitively() {
    let stack = TestStack::new();
    let (token, _) = stack.signup("Olive", Some("Gold")).await;
    let app = stack.app().await;
    create(&app, &token, "Corner Cafe").await;
    create(&app, &token, "Hardware Store").await;

    let request = actix_test::TestRequest::get()
        .uri("/api/businesses?search=CAFE")
        .to_request();
    let body = json_body(actix_test::call_service(&app, request).await).await;

    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["data"][0]["name"], "Corner Cafe");
}

#[rstest]
#[case("not-a-uuid", StatusCode::BAD_REQUEST, "invalid_request")]
#[case("3fa85f64-5717-4562-b3fc-2c963f66afa6", StatusCode::NOT_FOUND, "not_found")]
#[actix_web::test]
async fn get_reports_malformed_and_unknown_ids(
    #[case] id: &str,
    #[case] status: StatusCode,
    #[case] code: &str,
) {
    let stack = TestStack::new();
    let app = stack.app().await;

    let request = actix_test::TestRequest::get()
        .uri(&format!("/api/businesses/{id}"))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), status);
    assert_eq!(json_body(response).await["code"], code);
}

#[actix_web::test]
async fn update_by_owner_changes_fields_and_others_are_forbidden() {
    let stack = TestStack::new();
    let (owner, _) = stack.signup("Olive", None).await;
    let (stranger, _) = stack.signup("Peter", None).await;
    let app = stack.app().await;
    let id = id_of(&create(&app, &owner, "Old name").await);

    let forbidden = actix_test::TestRequest::put()
        .uri(&format!("/api/businesses/{id}"))
        .insert_header(bearer(&stranger))
        .set_json(json!({"name": "Hijacked"}))
        .to_request();
    let response = actix_test::call_service(&app, forbidden).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let allowed = actix_test::TestRequest::put()
        .uri(&format!("/api/businesses/{id}"))
        .insert_header(bearer(&owner))
        .set_json(json!({"name": "New name"}))
        .to_request();
    let body = json_body(actix_test::call_service(&app, allowed).await).await;
    assert_eq!(body["data"]["name"], "New name");
    assert_eq!(body["data"]["category"], "Food");
}

#[actix_web::test]
async fn subscription_rules_are_enforced() {
    let stack = TestStack::new();
    let (owner, _) = stack.signup("Olive", None).await;
    let (fan, fan_user) = stack.signup("Peter", None).await;
    let app = stack.app().await;
    let id = id_of(&create(&app, &owner, "Cafe").await);
    let subscribe = |token: &str| {
        actix_test::TestRequest::post()
            .uri(&format!("/api/businesses/{id}/subscribe"))
            .insert_header(bearer(token))
            .to_request()
    };

    let own = actix_test::call_service(&app, subscribe(&owner)).await;
    assert_eq!(own.status(), StatusCode::FORBIDDEN);

    let first = actix_test::call_service(&app, subscribe(&fan)).await;
    assert_eq!(first.status(), StatusCode::OK);
    let body = json_body(first).await;
    assert_eq!(body["message"], "Subscribed");
    assert_eq!(body["data"]["subscribers"][0]["id"], fan_user.id.to_string());

    let again = actix_test::call_service(&app, subscribe(&fan)).await;
    assert_eq!(again.status(), StatusCode::CONFLICT);

    let unsubscribe = actix_test::TestRequest::post()
        .uri(&format!("/api/businesses/{id}/unsubscribe"))
        .insert_header(bearer(&fan))
        .to_request();
    let body = json_body(actix_test::call_service(&app, unsubscribe).await).await;
    assert_eq!(body["data"]["subscribers"], json!([]));
}

#[actix_web::test]
async fn admins_may_delete_any_listing() {
    let stack = TestStack::new();
    let (owner, _) = stack.signup("Olive", None).await;
    let (stranger, _) = stack.signup("Peter", None).await;
    let (admin, _) = stack.admin().await;
    let app = stack.app().await;
    let id = id_of(&create(&app, &owner, "Cafe").await);
    let delete = |token: &str| {
        actix_test::TestRequest::delete()
            .uri(&format!("/api/businesses/{id}"))
            .insert_header(bearer(token))
            .to_request()
    };

    let denied = actix_test::call_service(&app, delete(&stranger)).await;
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);

    let deleted = actix_test::call_service(&app, delete(&admin)).await;
    assert_eq!(deleted.status(), StatusCode::OK);
    assert_eq!(
        json_body(deleted).await,
        json!({"success": true, "data": null, "message": "Business deleted"})
    );

    let gone = actix_test::TestRequest::get()
        .uri(&format!("/api/businesses/{id}"))
        .to_request();
    let response = actix_test::call_service(&app, gone).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn responses_carry_a_trace_id_header() {
    let stack = TestStack::new();
    let app = stack.app().await;

    let request = actix_test::TestRequest::get()
        .uri("/api/businesses")
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert!(response.headers().contains_key("trace-id"));
}
