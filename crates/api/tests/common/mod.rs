#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use quickvote_api::auth::jwt::{generate_access_token, JwtConfig};
use quickvote_api::config::ServerConfig;
use quickvote_api::router::build_app_router;
use quickvote_api::state::AppState;
use quickvote_core::error::CoreError;
use quickvote_core::notify::{NoopNotifier, ResponseNotifier};
use quickvote_core::roles::ROLE_USER;
use quickvote_core::types::DbId;
use quickvote_events::{EventBus, ThresholdNotifier};
use sqlx::PgPool;
use tower::ServiceExt;

const TEST_SECRET: &str = "integration-test-secret-long-enough-for-hs256";

/// A `ServerConfig` with local-development defaults and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        trust_proxy_headers: false,
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

fn build_app(
    pool: PgPool,
    config: ServerConfig,
    notifier: Option<Arc<dyn ResponseNotifier>>,
) -> Router {
    let event_bus = Arc::new(EventBus::default());
    let notifier: Arc<dyn ResponseNotifier> = match notifier {
        Some(notifier) => notifier,
        None => Arc::new(ThresholdNotifier::new(pool.clone(), Arc::clone(&event_bus))),
    };
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus,
        notifier,
    };
    build_app_router(state, &config)
}

/// The full application router, with the real threshold notifier.
pub fn build_test_app(pool: PgPool) -> Router {
    build_app(pool, test_config(), None)
}

/// The application router with notifications switched off.
pub fn build_test_app_without_notifier(pool: PgPool) -> Router {
    build_test_app_with_notifier(pool, Arc::new(NoopNotifier))
}

pub fn build_test_app_with_notifier(pool: PgPool, notifier: Arc<dyn ResponseNotifier>) -> Router {
    build_app(pool, test_config(), Some(notifier))
}

/// The application router deployed behind a proxy whose forwarding headers
/// are trusted.
pub fn build_test_app_behind_proxy(pool: PgPool) -> Router {
    let config = ServerConfig {
        trust_proxy_headers: true,
        ..test_config()
    };
    build_app(pool, config, None)
}

/// Notifier that always errors and counts how often it was asked.
#[derive(Debug, Default)]
pub struct FailingNotifier {
    pub calls: AtomicUsize,
}

impl FailingNotifier {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResponseNotifier for FailingNotifier {
    async fn response_recorded(&self, _survey_id: DbId, _total: i64) -> Result<(), CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(CoreError::Internal("notification backend unavailable".to_string()))
    }
}

/// A valid bearer token for `user_id` with `role`.
pub fn token_for(user_id: i64, role: &str) -> String {
    generate_access_token(user_id, role, &test_config().jwt).expect("token generation")
}

pub fn user_token(user_id: i64) -> String {
    token_for(user_id, ROLE_USER)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

/// POST a JSON body as an anonymous caller connected from `peer`, with
/// extra request headers.
pub async fn post_json_from(
    app: Router,
    uri: &str,
    peer: SocketAddr,
    headers: &[(&str, &str)],
    body: serde_json::Value,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("Content-Type", "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let mut request = builder.body(Body::from(body.to_string())).unwrap();
    request.extensions_mut().insert(ConnectInfo(peer));
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Body for a survey with one single-choice question (A, B) and one rating.
pub fn sample_survey(visibility: &str) -> serde_json::Value {
    serde_json::json!({
        "title": "Team lunch",
        "description": "Where should we go?",
        "visibility": visibility,
        "status": "active",
        "questions": [
            {
                "text": "Pick a place",
                "type": "single",
                "is_required": true,
                "choices": [{"label": "A"}, {"label": "B"}]
            },
            {
                "text": "How hungry are you?",
                "type": "rating",
                "is_required": false
            }
        ]
    })
}

/// Create `sample_survey` as `owner_id`; returns the response `data`.
pub async fn create_sample_survey(pool: &PgPool, owner_id: i64, visibility: &str) -> serde_json::Value {
    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/surveys",
        &user_token(owner_id),
        sample_survey(visibility),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"].clone()
}
