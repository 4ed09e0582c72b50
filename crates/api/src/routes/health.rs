use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct PoolStats {
    pub size: u32,
    pub idle: usize,
}

/// `GET /health` payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    pub db_pool: PoolStats,
    /// Claim paths currently held in memory.
    pub active_claim_paths: usize,
    /// Simplified outlines held in the viewport cache.
    pub cached_outlines: usize,
}

/// GET /health -- always 200 while the process is up; reports database and
/// in-memory state.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = terraclaim_db::health_check(&state.pool).await.is_ok();

    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        db_pool: PoolStats {
            size: state.pool.size(),
            idle: state.pool.num_idle(),
        },
        active_claim_paths: state.sessions.len().await,
        cached_outlines: state.simplification_cache.len().await,
    })
}

/// GET /health/ready -- 503 until the database answers, for load balancers.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match terraclaim_db::health_check(&state.pool).await {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Mounted at the root, outside `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness))
}
