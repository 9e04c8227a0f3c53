#![allow(dead_code)]

use api_lib::adapters::{Argon2Hasher, InMemoryDatabase, InMemoryKeyValueStore};
use api_lib::config::Config;
use api_lib::web::{router, state::AppState};
use async_trait::async_trait;
use axum_test::{TestResponse, TestServer};
use medilog_core::ports::{ExternalIdentityProvider, PortError, PortResult};
use medilog_core::ExternalIdentity;
use serde_json::json;
use std::sync::Arc;

pub const GOOD_GOOGLE_TOKEN: &str = "valid-google-token";

/// Accepts exactly one token and maps it to a fixed identity.
pub struct FakeGoogle;

#[async_trait]
impl ExternalIdentityProvider for FakeGoogle {
    async fn verify(&self, token: &str) -> PortResult<ExternalIdentity> {
        if token == GOOD_GOOGLE_TOKEN {
            Ok(ExternalIdentity {
                subject: "google-sub-42".to_string(),
                email: Some("gwen@example.com".to_string()),
                display_name: Some("Gwen".to_string()),
            })
        } else {
            Err(PortError::Unauthorized)
        }
    }
}

/// Test server with access to the backing store
pub struct TestApp {
    pub server: TestServer,
    pub db: Arc<InMemoryDatabase>,
}

impl TestApp {
    /// Google sign-in disabled
    pub fn new() -> Self {
        Self::build(None)
    }

    pub fn with_google() -> Self {
        Self::build(Some(Arc::new(FakeGoogle)))
    }

    fn build(external: Option<Arc<dyn ExternalIdentityProvider>>) -> Self {
        let db = Arc::new(InMemoryDatabase::new());
        let state = Arc::new(AppState::new(
            Arc::new(Config::for_tests()),
            db.clone(),
            Arc::new(InMemoryKeyValueStore::new()),
            Arc::new(Argon2Hasher::default()),
            external,
        ));
        let app = router(state).expect("Failed to build router");
        let server = TestServer::builder()
            .mock_transport()
            .build(app)
            .expect("Failed to create test server");
        Self { server, db }
    }

    /// Registers an account and returns the `Cookie` header value for its session.
    pub async fn register(&self, email: &str, role: &str) -> String {
        let response = self
            .server
            .post("/auth/register")
            .json(&json!({
                "name": "Test User",
                "email": email,
                "password": "hunter22",
                "role": role,
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        session_cookie(&response)
    }
}

/// The `session=<token>` pair from a response's `Set-Cookie` header.
pub fn session_cookie(response: &TestResponse) -> String {
    let header = response.header("set-cookie");
    let value = header.to_str().expect("set-cookie is not ASCII");
    value
        .split(';')
        .next()
        .expect("empty set-cookie")
        .trim()
        .to_string()
}
