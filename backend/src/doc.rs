//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: every HTTP endpoint from the inbound layer
//! - **Schemas**: request DTOs, response views, and the failure envelope
//! - **Security**: bearer token authentication scheme
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::domain::{AdminReviewView, BusinessView, ReviewView};
use crate::inbound::http::accounts::{LoginRequest, SessionResponse, SignupRequest, UserResponse};
use crate::inbound::http::businesses::BusinessRequest;
use crate::inbound::http::error::FailureEnvelope;
use crate::inbound::http::reviews::ReviewRequest;
use crate::inbound::http::users::UpgradePlanRequest;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerAuth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "Token issued by POST /api/auth/signup or POST /api/auth/login.",
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Listings backend API",
        description = "HTTP interface for business listings, reviews, subscriptions, and health probes."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        crate::inbound::http::accounts::signup,
        crate::inbound::http::accounts::login,
        crate::inbound::http::accounts::me,
        crate::inbound::http::accounts::logout,
        crate::inbound::http::businesses::list_businesses,
        crate::inbound::http::businesses::get_business,
        crate::inbound::http::businesses::create_business,
        crate::inbound::http::businesses::update_business,
        crate::inbound::http::businesses::delete_business,
        crate::inbound::http::businesses::subscribe,
        crate::inbound::http::businesses::unsubscribe,
        crate::inbound::http::reviews::list_reviews,
        crate::inbound::http::reviews::add_review,
        crate::inbound::http::reviews::delete_review,
        crate::inbound::http::users::saved_businesses,
        crate::inbound::http::users::upgrade_plan,
        crate::inbound::http::admin::moderation_reviews,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        SignupRequest,
        LoginRequest,
        BusinessRequest,
        ReviewRequest,
        UpgradePlanRequest,
        UserResponse,
        SessionResponse,
        BusinessView,
        ReviewView,
        AdminReviewView,
        FailureEnvelope,
    )),
    tags(
        (name = "auth", description = "Account registration and bearer tokens"),
        (name = "businesses", description = "Business listings and subscriptions"),
        (name = "reviews", description = "Reviews embedded in listings"),
        (name = "users", description = "Caller account operations"),
        (name = "admin", description = "Moderation endpoints"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated document.

    use super::*;
    use rstest::rstest;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    /// Assert that an Object schema contains a field with the given name.
    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("/api/auth/signup")]
    #[case("/api/auth/login")]
    #[case("/api/auth/me")]
    #[case("/api/businesses")]
    #[case("/api/businesses/{id}")]
    #[case("/api/businesses/{id}/subscribe")]
    #[case("/api/businesses/{id}/reviews/{reviewId}")]
    #[case("/api/users/upgrade-plan")]
    #[case("/api/admin/reviews")]
    #[case("/health/ready")]
    fn registers_paths(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing path {path}");
    }

    #[test]
    fn failure_envelope_schema_carries_success_flag() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas.get("FailureEnvelope").expect("FailureEnvelope schema");
        let rendered = serde_json::to_string(schema).expect("schema json");

        assert!(rendered.contains("\"success\""));
    }

    #[test]
    fn user_response_schema_omits_password_hash() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas.get("UserResponse").expect("UserResponse schema");

        assert_object_schema_has_field(schema, "savedBusinesses");
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(!obj.properties.keys().any(|key| key.contains("password")));
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn bearer_security_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("BearerAuth"));
    }
}
