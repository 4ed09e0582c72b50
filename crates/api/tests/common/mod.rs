#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use terraclaim_api::auth::jwt::{issue_player_token, JwtConfig};
use terraclaim_api::config::ServerConfig;
use terraclaim_api::router::build_app_router;
use terraclaim_api::sessions::ClaimSessionManager;
use terraclaim_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        database_max_connections: 5,
        request_timeout_secs: 30,
        path_inactivity_timeout_secs: 600,
        lifecycle_sweep_interval_secs: 3600,
        session_sweep_interval_secs: 60,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            issuer: None,
            leeway_secs: 0,
            token_ttl_mins: 15,
        },
    }
}

/// Build the full application router over `pool`.
///
/// Each call gets a fresh session store; use [`build_test_app_with_sessions`]
/// when a claim must survive several requests.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_sessions(pool, Arc::new(ClaimSessionManager::new()))
}

pub fn build_test_app_with_sessions(pool: PgPool, sessions: Arc<ClaimSessionManager>) -> Router {
    let config = test_config();
    let mut state = AppState::new(pool, config.clone());
    state.sessions = sessions;
    build_app_router(state, &config)
}

/// A valid Bearer token for `user_id`.
pub fn token_for(user_id: i64) -> String {
    issue_player_token(user_id, &test_config().jwt).expect("token should be issued")
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>, token: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, Some(token)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(token)).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(body), Some(token)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None, Some(token)).await
}
