//! Shared helpers for backend integration tests.
//!
//! Integration tests compile as separate crates under `backend/tests/`, so
//! the in-memory application stack and small HTTP helpers live here.

use std::net::SocketAddr;
use std::sync::Arc;

use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::header;
use actix_web::{test, web};
use serde_json::{Value, json};

use listings_backend::domain::ports::UserRepository;
use listings_backend::domain::{Role, UserId};
use listings_backend::inbound::http::health::HealthState;
use listings_backend::outbound::memory::{InMemoryBusinessRepository, InMemoryUserRepository};
use listings_backend::server::{
    AppDependencies, AppStates, ServerConfig, build_app, build_in_memory_states,
};

pub const ALLOWED_ORIGIN: &str = "http://localhost:5173";

/// In-memory application state with direct access to the user store.
#[derive(Clone)]
pub struct TestStack {
    pub states: AppStates,
    pub users: Arc<InMemoryUserRepository>,
}

/// Bearer token and id of a freshly registered account.
#[derive(Debug, Clone)]
pub struct Account {
    pub token: String,
    pub id: String,
}

impl TestStack {
    pub fn new() -> Self {
        let users = Arc::new(InMemoryUserRepository::new());
        let config = ServerConfig::new(SocketAddr::from(([127, 0, 0, 1], 0)), "integration-secret")
            .with_allowed_origins(vec![ALLOWED_ORIGIN.to_owned()]);
        let states = build_in_memory_states(
            users.clone(),
            Arc::new(InMemoryBusinessRepository::new()),
            &config,
        );
        Self { states, users }
    }

    pub fn dependencies(&self) -> AppDependencies {
        AppDependencies {
            health_state: web::Data::new(HealthState::new()),
            states: self.states.clone(),
        }
    }

    pub async fn app(
        &self,
    ) -> impl Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error> {
        test::init_service(build_app(self.dependencies())).await
    }

    /// Promote an existing account to the admin role.
    pub async fn promote(&self, account: &Account) {
        let id = UserId::new(&account.id).expect("user id");
        let mut user = self
            .users
            .find_by_id(&id)
            .await
            .expect("lookup user")
            .expect("user exists");
        user.role = Role::Admin;
        self.users.update(&user).await.expect("promote admin");
    }
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

pub async fn json_body(response: ServiceResponse<BoxBody>) -> Value {
    let body = test::read_body(response).await;
    serde_json::from_slice(&body).expect("JSON body")
}

/// Send a request and return its status and decoded body.
pub async fn call<S>(app: &S, request: Request) -> (u16, Value)
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let response = test::call_service(app, request).await;
    let status = response.status().as_u16();
    (status, json_body(response).await)
}

/// Register through the HTTP API.
pub async fn signup<S>(app: &S, name: &str) -> Account
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let request = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({
            "name": name,
            "email": format!("{}@example.test", name.to_lowercase()),
            "password": "secret-pass",
        }))
        .to_request();
    let (status, body) = call(app, request).await;
    assert_eq!(status, 201, "signup failed: {body}");
    Account {
        token: body["data"]["token"]
            .as_str()
            .expect("token")
            .to_owned(),
        id: body["data"]["user"]["id"].as_str().expect("user id").to_owned(),
    }
}

/// Create a listing and return the full response.
pub async fn create_business<S>(app: &S, owner: &Account, name: &str) -> (u16, Value)
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let request = test::TestRequest::post()
        .uri("/api/businesses")
        .insert_header(bearer(&owner.token))
        .set_json(json!({
            "name": name,
            "description": format!("{name} description"),
            "category": "Food",
        }))
        .to_request();
    call(app, request).await
}
