#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use stride_api::config::ServerConfig;
use stride_api::router::build_app_router;
use stride_api::state::AppState;
use stride_delivery::content::{ContentError, ContentGenerator, ContentRequest, MotivationContent};
use stride_delivery::email::{EmailError, EmailTransport};

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses UTC with a midnight boundary so "today" in tests is simply the
/// current UTC date.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        delivery_timezone: "UTC".to_string(),
        day_boundary_hour: 0,
    }
}

/// Deterministic content generator for tests.
pub struct StubGenerator;

#[async_trait]
impl ContentGenerator for StubGenerator {
    async fn generate(&self, request: &ContentRequest) -> Result<MotivationContent, ContentError> {
        Ok(MotivationContent {
            message: format!("Go get it: {}", request.goal_title),
            micro_plan: vec!["one small step".to_string()],
            challenge: "finish early".to_string(),
        })
    }
}

/// Email transport that records instead of sending.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl EmailTransport for RecordingMailer {
    async fn send(&self, recipient: &str, subject: &str, _body: &str) -> Result<(), EmailError> {
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), subject.to_string()));
        Ok(())
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool and in-memory collaborators.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack that production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_mailer(pool).0
}

/// Like [`build_test_app`], also handing back the recording mailer.
pub fn build_test_app_with_mailer(pool: PgPool) -> (Router, Arc<RecordingMailer>) {
    let config = test_config();
    let clock = config.civil_clock().unwrap();
    let mailer = Arc::new(RecordingMailer::default());

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        clock,
        content: Arc::new(StubGenerator),
        mailer: Arc::clone(&mailer) as Arc<dyn EmailTransport>,
    };

    (build_app_router(state, &config), mailer)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a request with the given owner key header.
pub async fn request(
    app: Router,
    method: Method,
    path: &str,
    owner_key: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(key) = owner_key {
        builder = builder.header("x-owner-key", key);
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, path: &str, owner_key: &str) -> Response<Body> {
    request(app, Method::GET, path, Some(owner_key), None).await
}

pub async fn post_json(app: Router, path: &str, owner_key: &str, body: Value) -> Response<Body> {
    request(app, Method::POST, path, Some(owner_key), Some(body)).await
}

pub async fn post_empty(app: Router, path: &str, owner_key: &str) -> Response<Body> {
    request(app, Method::POST, path, Some(owner_key), None).await
}

pub async fn delete(app: Router, path: &str, owner_key: &str) -> Response<Body> {
    request(app, Method::DELETE, path, Some(owner_key), None).await
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert a policy-rejection response: expected status plus stable code.
pub async fn assert_rejection(response: Response<Body>, status: StatusCode, code: &str) {
    assert_eq!(response.status(), status);
    let json = body_json(response).await;
    assert_eq!(json["code"], code);
}
