//! Common test utilities for in-process API testing with mocks.
//!
//! The fixture wires a real `Selector` over mock providers and drives the
//! router with `oneshot`, so no network or port is involved.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use navigator_core::{testing::MockProvider, Config, Provider, ResultCache, Selector};
use navigator_server::{api::create_router, state::AppState};

/// Re-export fixtures for test convenience
pub use navigator_core::testing::fixtures;

pub struct TestFixture {
    pub router: Router,
    /// Providers as registered, so tests can inspect call counts.
    pub providers: Vec<MockProvider>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

impl TestFixture {
    pub fn new(providers: Vec<MockProvider>) -> Self {
        Self::with_config(Config::default(), providers)
    }

    pub fn with_config(config: Config, providers: Vec<MockProvider>) -> Self {
        let registered = providers
            .iter()
            .cloned()
            .map(|p| Arc::new(p) as Arc<dyn Provider>)
            .collect();
        let selector = Selector::new(
            registered,
            ResultCache::new(config.cache.capacity, config.cache.ttl()),
        )
        .with_deadline(Duration::from_secs(2));

        let state = Arc::new(AppState::new(config, selector));

        Self {
            router: create_router(state),
            providers,
        }
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8_lossy(&bytes).into_owned();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);

        TestResponse { status, body, text }
    }
}
