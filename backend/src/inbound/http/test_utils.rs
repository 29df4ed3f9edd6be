//! Shared fixtures for HTTP handler tests.

use std::net::SocketAddr;
use std::sync::Arc;

use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::header;
use actix_web::{test as actix_test, web};
use serde_json::Value;

use crate::domain::ports::UserRepository;
use crate::domain::{NewAccount, Role, User};
use crate::inbound::http::health::HealthState;
use crate::outbound::memory::{InMemoryBusinessRepository, InMemoryUserRepository};
use crate::server::{AppDependencies, AppStates, ServerConfig, build_app, build_in_memory_states};

/// In-memory application state with direct access to the user store.
pub(crate) struct TestStack {
    pub states: AppStates,
    pub users: Arc<InMemoryUserRepository>,
}

impl TestStack {
    pub fn new() -> Self {
        let users = Arc::new(InMemoryUserRepository::new());
        let config = ServerConfig::new(SocketAddr::from(([127, 0, 0, 1], 0)), "test-secret")
            .with_allowed_origins(vec!["http://localhost:5173".to_owned()]);
        let states = build_in_memory_states(
            users.clone(),
            Arc::new(InMemoryBusinessRepository::new()),
            &config,
        );
        Self { states, users }
    }

    pub async fn app(
        &self,
    ) -> impl Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error> {
        let health_state = web::Data::new(HealthState::new());
        actix_test::init_service(build_app(AppDependencies {
            health_state,
            states: self.states.clone(),
        }))
        .await
    }

    /// Create an account and return its bearer token and record.
    pub async fn signup(&self, name: &str, plan: Option<&str>) -> (String, User) {
        let email = format!("{}@example.test", name.to_lowercase());
        let account = NewAccount::try_from_parts(name, &email, "secret-pass", plan)
            .expect("valid account");
        let session = self
            .states
            .http
            .accounts
            .signup(account)
            .await
            .expect("signup succeeds");
        (session.token.token, session.user)
    }

    /// Create an account holding the admin role.
    pub async fn admin(&self) -> (String, User) {
        let (token, mut user) = self.signup("Admin", None).await;
        user.role = Role::Admin;
        self.users.update(&user).await.expect("promote admin");
        (token, user)
    }
}

pub(crate) fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

pub(crate) async fn json_body(response: ServiceResponse<BoxBody>) -> Value {
    let body = actix_test::read_body(response).await;
    serde_json::from_slice(&body).expect("JSON body")
}
