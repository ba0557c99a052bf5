//! Common test utilities for integration tests
//!
//! Every test gets its own router over a fresh [`MemoryStore`], so tests can
//! run in parallel without a database. Users are inserted directly into the
//! store with a password hash computed once per test binary.
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::{Arc, OnceLock};
use tasklist_api::{
    app::{build_router, AppState},
    config::{ApiConfig, AuthConfig, Config, DatabaseConfig, LoggingConfig, MEMORY_DATABASE_URL},
};
use tasklist_shared::{
    auth::{password::hash_password, token::TokenIssuer},
    models::{
        task::Task,
        user::{CreateUser, User},
    },
    store::{MemoryStore, Store, UserStore},
};
use tower::ServiceExt;

/// Password of every user made by [`TestContext::create_user`]
pub const TEST_PASSWORD: &str = "password123";

fn test_password_hash() -> &'static str {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| hash_password(TEST_PASSWORD).expect("hashing test password"))
}

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
        },
        database: DatabaseConfig {
            url: MEMORY_DATABASE_URL.to_string(),
            max_connections: 1,
        },
        auth: AuthConfig::default(),
        logging: LoggingConfig::default(),
    }
}

/// Test context containing the router and the store behind it
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub issuer: TokenIssuer,
    pub app: Router,
}

/// A user with a valid bearer token
pub struct TestUser {
    pub user: User,
    pub token: String,
}

/// Status and decoded body of a response (`Value::Null` when empty)
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let dyn_store: Arc<dyn Store> = store.clone();
        let state = AppState::new(dyn_store, test_config());
        let issuer = state.issuer.clone();

        Self {
            store,
            issuer,
            app: build_router(state),
        }
    }

    /// Inserts a user with [`TEST_PASSWORD`] and issues a token for them
    pub async fn create_user(&self, email: &str) -> TestUser {
        let user = self
            .store
            .create_user(CreateUser {
                name: format!("User {}", email),
                email: email.to_string(),
                password_hash: test_password_hash().to_string(),
            })
            .await
            .expect("creating test user");

        let issued = self
            .issuer
            .issue(self.store.as_ref(), &user, "api_token")
            .await
            .expect("issuing test token");

        TestUser {
            user,
            token: issued.plaintext,
        }
    }

    /// Creates a task through the API and returns it
    pub async fn create_task(&self, owner: &TestUser, title: &str) -> Task {
        let response = self
            .send(
                Method::POST,
                "/tasks",
                Some(&owner.token),
                Some(serde_json::json!({ "title": title })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);

        serde_json::from_value(response.body).expect("task body")
    }

    /// Sends a request with an optional bearer token and JSON body
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let body = body.map(|value| value.to_string());
        self.send_raw(method, uri, token, body.as_deref()).await
    }

    /// Sends a request whose body is passed through verbatim
    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("building request");

        let response = self.app.clone().oneshot(request).await.expect("router is infallible");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("reading body");

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse { status, body }
    }
}
