//! Account handlers: signup, login, current user, logout.
//!
//! ```text
//! POST /api/auth/signup {"name":"Ada","email":"ada@example.com","password":"secret1","plan":"Gold"}
//! POST /api/auth/login  {"email":"ada@example.com","password":"secret1"}
//! GET  /api/auth/me
//! POST /api/auth/logout
//! ```

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::AccountSession;
use crate::domain::{ApiResult, LoginCredentials, NewAccount, Plan, Role, User};

use super::auth::AuthenticatedUser;
use super::envelope::{self, Envelope};
use super::error::FailureEnvelope;
use super::state::HttpState;
use super::validation::{map_login_validation_error, map_signup_validation_error};

/// Signup request body. `plan` defaults to `Standard`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[schema(example = "Gold")]
    pub plan: Option<String>,
}

impl TryFrom<SignupRequest> for NewAccount {
    type Error = crate::domain::SignupValidationError;

    fn try_from(value: SignupRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(
            value.name.as_deref().unwrap_or_default(),
            value.email.as_deref().unwrap_or_default(),
            value.password.as_deref().unwrap_or_default(),
            value.plan.as_deref(),
        )
    }
}

/// Login request body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = crate::domain::LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(
            value.email.as_deref().unwrap_or_default(),
            value.password.as_deref().unwrap_or_default(),
        )
    }
}

/// Account as returned to its owner. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub plan: Plan,
    pub role: Role,
    pub saved_businesses: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.as_ref().to_owned(),
            email: user.email.as_ref().to_owned(),
            plan: user.plan,
            role: user.role,
            saved_businesses: user
                .saved_businesses
                .iter()
                .map(ToString::to_string)
                .collect(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Issued bearer token and the signed-in account.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserResponse,
}

impl From<AccountSession> for SessionResponse {
    fn from(session: AccountSession) -> Self {
        Self {
            token: session.token.token,
            expires_at: session.token.expires_at,
            user: UserResponse::from(&session.user),
        }
    }
}

/// Register an account and sign it in.
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = Envelope<SessionResponse>),
        (status = 400, description = "Invalid request", body = FailureEnvelope),
        (status = 409, description = "Email already registered", body = FailureEnvelope),
        (status = 500, description = "Internal server error", body = FailureEnvelope)
    ),
    tags = ["auth"],
    operation_id = "signup",
    security([])
)]
#[post("/auth/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    payload: web::Json<SignupRequest>,
) -> ApiResult<HttpResponse> {
    let account = NewAccount::try_from(payload.into_inner()).map_err(map_signup_validation_error)?;
    let session = state.accounts.signup(account).await?;
    Ok(envelope::created(SessionResponse::from(session)))
}

/// Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = Envelope<SessionResponse>),
        (status = 400, description = "Invalid request", body = FailureEnvelope),
        (status = 401, description = "Invalid credentials", body = FailureEnvelope),
        (status = 500, description = "Internal server error", body = FailureEnvelope)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let session = state.accounts.login(credentials).await?;
    Ok(envelope::ok(SessionResponse::from(session)))
}

/// Profile of the authenticated caller.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = Envelope<UserResponse>),
        (status = 401, description = "Unauthorised", body = FailureEnvelope),
        (status = 500, description = "Internal server error", body = FailureEnvelope)
    ),
    tags = ["auth"],
    operation_id = "currentUser"
)]
#[get("/auth/me")]
pub async fn me(AuthenticatedUser(user): AuthenticatedUser) -> ApiResult<HttpResponse> {
    Ok(envelope::ok(UserResponse::from(&user)))
}

/// Acknowledge a logout. Tokens are stateless, so the client discards its copy.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = Envelope<Option<String>>),
        (status = 401, description = "Unauthorised", body = FailureEnvelope)
    ),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/auth/logout")]
pub async fn logout(_user: AuthenticatedUser) -> ApiResult<HttpResponse> {
    Ok(envelope::acknowledged("Logged out"))
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
    async fn signup_returns_token_and_user_without_hash() {
        let stack = TestStack::new();
        let app = stack.app().await;

        let request = actix_test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(json!({
                "name": "Ada",
                "email": "ada@example.com",
                "password": "secret1",
                "plan": "Gold"
            }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert!(body["data"]["token"].as_str().is_some_and(|t| !t.is_empty()));
        assert_eq!(body["data"]["user"]["plan"], "Gold");
        assert_eq!(body["data"]["user"]["email"], "ada@example.com");
        assert!(body["data"]["user"].get("passwordHash").is_none());
    }

    #[rstest]
    #[case(json!({"name": "Ada", "email": "ada@example.com", "password": "123"}), "password", "too_short")]
    #[case(json!({"name": "Ada", "email": "not-an-email", "password": "secret1"}), "email", "invalid_email")]
    #[case(json!({"email": "ada@example.com", "password": "secret1"}), "name", "missing_field")]
    #[case(json!({"name": "Ada", "email": "ada@example.com", "password": "secret1", "plan": "Diamond"}), "plan", "invalid_plan")]
    #[actix_web::test]
    async fn signup_validation_names_the_field(
        #[case] payload: serde_json::Value,
        #[case] field: &str,
        #[case] code: &str,
    ) {
        let stack = TestStack::new();
        let app = stack.app().await;

        let request = actix_test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(payload)
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "invalid_request");
        assert_eq!(body["details"]["field"], field);
        assert_eq!(body["details"]["code"], code);
    }

    #[actix_web::test]
    async fn duplicate_email_is_a_conflict() {
        let stack = TestStack::new();
        stack.signup("Ada", None).await;
        let app = stack.app().await;

        let request = actix_test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(json!({"name": "Other", "email": "ada@example.test", "password": "secret1"}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn wrong_password_is_unauthorized() {
        let stack = TestStack::new();
        stack.signup("Ada", None).await;
        let app = stack.app().await;

        let request = actix_test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({"email": "ada@example.test", "password": "wrong-pass"}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Invalid credentials");
    }

    #[actix_web::test]
    async fn login_then_me_round_trip() {
        let stack = TestStack::new();
        stack.signup("Ada", Some("Platinum")).await;
        let app = stack.app().await;

        let login_req = actix_test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({"email": "ada@example.test", "password": "secret-pass"}))
            .to_request();
        let body = json_body(actix_test::call_service(&app, login_req).await).await;
        let token = body["data"]["token"].as_str().expect("token").to_owned();

        let me_req = actix_test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(bearer(&token))
            .to_request();
        let response = actix_test::call_service(&app, me_req).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["data"]["name"], "Ada");
        assert_eq!(body["data"]["plan"], "Platinum");
    }

    #[rstest]
    #[case(None, "missing_token")]
    #[case(Some("not.a.token"), "token_invalid")]
    #[actix_web::test]
    async fn me_rejects_missing_and_forged_tokens(
        #[case] token: Option<&str>,
        #[case] reason: &str,
    ) {
        let stack = TestStack::new();
        let app = stack.app().await;

        let mut request = actix_test::TestRequest::get().uri("/api/auth/me");
        if let Some(token) = token {
            request = request.insert_header(bearer(token));
        }
        let response = actix_test::call_service(&app, request.to_request()).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert_eq!(body["code"], "unauthorized");
        assert_eq!(body["details"]["reason"], reason);
    }

    #[actix_web::test]
    async fn logout_acknowledges_with_null_data() {
        let stack = TestStack::new();
        let (token, _) = stack.signup("Ada", None).await;
        let app = stack.app().await;

        let request = actix_test::TestRequest::post()
            .uri("/api/auth/logout")
            .insert_header(bearer(&token))
            .to_request();
        let body = json_body(actix_test::call_service(&app, request).await).await;

        assert_eq!(
            body,
            json!({"success": true, "data": null, "message": "Logged out"})
        );
    }
}
