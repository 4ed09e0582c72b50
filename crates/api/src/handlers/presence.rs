//! Handlers for player presence and spawn-density suggestions.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use validator::Validate;

use terraclaim_core::density::{
    nearby_count, online_cutoff, DensitySuggestion, PresenceFix, MAX_DENSITY_RADIUS_METERS,
};
use terraclaim_core::geodesy::{BoundingBox, Coordinate};
use terraclaim_db::repositories::HeartbeatRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct HeartbeatRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lon: f64,
}

/// `?lat=&lon=&radius_meters=`
#[derive(Debug, Deserialize, Validate)]
pub struct DensityParams {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lon: f64,
    #[validate(range(exclusive_min = 0.0, max = MAX_DENSITY_RADIUS_METERS))]
    pub radius_meters: f64,
}

// ---------------------------------------------------------------------------
// POST /presence/heartbeat
// ---------------------------------------------------------------------------

pub async fn heartbeat(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<HeartbeatRequest>,
) -> AppResult<impl IntoResponse> {
    body.validate()?;
    let row = HeartbeatRepo::upsert(&state.pool, auth.user_id, &Coordinate::new(body.lat, body.lon))
        .await?;
    Ok(Json(DataResponse { data: row }))
}

// ---------------------------------------------------------------------------
// POST /presence/offline
// ---------------------------------------------------------------------------

/// Drop the caller out of density counts immediately.
pub async fn mark_offline(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<impl IntoResponse> {
    let updated = HeartbeatRepo::mark_offline(&state.pool, auth.user_id).await?;
    tracing::debug!(user_id = auth.user_id, updated, "Player marked offline");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// GET /presence/density
// ---------------------------------------------------------------------------

/// Count online players near a point and suggest how many points of
/// interest to spawn.
pub async fn density(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<DensityParams>,
) -> AppResult<impl IntoResponse> {
    params.validate()?;
    let center = Coordinate::new(params.lat, params.lon);
    let now = Utc::now();

    let bbox = BoundingBox::around(&center, params.radius_meters);
    let rows = HeartbeatRepo::list_online_in_bbox(&state.pool, &bbox, online_cutoff(now)).await?;
    let fixes: Vec<PresenceFix> = rows.iter().map(PresenceFix::from).collect();

    let count = nearby_count(&center, params.radius_meters, auth.user_id, &fixes, now);
    Ok(Json(DataResponse {
        data: DensitySuggestion::from_count(count),
    }))
}
