//! Handlers for walking a claim: start, sample, close, commit, cancel.
//!
//! The candidate path lives in [`ClaimSessionManager`](crate::sessions::ClaimSessionManager);
//! only the final commit touches the database.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use terraclaim_core::error::CoreError;
use terraclaim_core::geodesy::Coordinate;
use terraclaim_core::types::Timestamp;
use terraclaim_core::validator::LocationSample;
use terraclaim_db::models::territory::{CreateTerritory, TerritoryView};
use terraclaim_db::repositories::{CommitError, TerritoryRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// One GPS fix reported by the client.
#[derive(Debug, Deserialize, Validate)]
pub struct SampleRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lon: f64,
    /// Device time of the fix.
    pub timestamp: Timestamp,
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub accuracy_meters: f64,
}

impl From<&SampleRequest> for LocationSample {
    fn from(req: &SampleRequest) -> Self {
        LocationSample {
            coordinate: Coordinate::new(req.lat, req.lon),
            timestamp: req.timestamp,
            accuracy_meters: req.accuracy_meters,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct CommitPathRequest {
    #[validate(length(max = 64))]
    pub name: Option<String>,
}

// ---------------------------------------------------------------------------
// POST /claims/path
// ---------------------------------------------------------------------------

/// Start a new candidate path, replacing any unfinished one.
pub async fn start_path(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<impl IntoResponse> {
    let snapshot = state.sessions.start(auth.user_id).await;
    tracing::info!(user_id = auth.user_id, "Claim path started");
    Ok((StatusCode::CREATED, Json(DataResponse { data: snapshot })))
}

// ---------------------------------------------------------------------------
// GET /claims/path
// ---------------------------------------------------------------------------

pub async fn get_path(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<impl IntoResponse> {
    let snapshot = state.sessions.snapshot(auth.user_id).await.ok_or(AppError::Core(
        CoreError::NotFound {
            entity: "ClaimPath",
            id: auth.user_id,
        },
    ))?;
    Ok(Json(DataResponse { data: snapshot }))
}

// ---------------------------------------------------------------------------
// DELETE /claims/path
// ---------------------------------------------------------------------------

/// Cancel the caller's path. Nothing is persisted.
pub async fn abandon_path(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<impl IntoResponse> {
    let snapshot = state.sessions.abandon(auth.user_id).await?;
    tracing::info!(
        user_id = auth.user_id,
        points = snapshot.point_count,
        "Claim path abandoned"
    );
    Ok(Json(DataResponse { data: snapshot }))
}

// ---------------------------------------------------------------------------
// POST /claims/path/samples
// ---------------------------------------------------------------------------

/// Append one location sample and report the verdict.
pub async fn append_sample(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<SampleRequest>,
) -> AppResult<impl IntoResponse> {
    body.validate()?;
    let result = state
        .sessions
        .append(auth.user_id, &LocationSample::from(&body))
        .await?;

    tracing::debug!(
        user_id = auth.user_id,
        outcome = ?result.outcome,
        points = result.path.point_count,
        "Location sample processed"
    );
    Ok(Json(DataResponse { data: result }))
}

// ---------------------------------------------------------------------------
// POST /claims/path/close
// ---------------------------------------------------------------------------

/// Close the loop, returning the ring and its area.
pub async fn close_path(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<impl IntoResponse> {
    let ring = state.sessions.close(auth.user_id).await?;
    Ok(Json(DataResponse { data: ring }))
}

// ---------------------------------------------------------------------------
// POST /claims/path/commit
// ---------------------------------------------------------------------------

/// Commit the caller's closed path as a territory.
///
/// On overlap the path stays closed so the client can show the conflicts; a
/// validation failure rejects the path. Once the territory is stored the
/// response is 201 even if the path was replaced or abandoned meanwhile.
pub async fn commit_path(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Option<Json<CommitPathRequest>>,
) -> AppResult<impl IntoResponse> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    body.validate()?;

    let closed = state.sessions.take_closed_ring(auth.user_id).await?;
    let input = CreateTerritory {
        owner_id: auth.user_id,
        name: body.name,
        ring: closed.ring,
    };

    match TerritoryRepo::commit(&state.pool, &input).await {
        Ok(territory) => {
            if let Err(e) = state.sessions.mark_committed(auth.user_id).await {
                tracing::warn!(
                    user_id = auth.user_id,
                    territory_id = territory.id,
                    error = %e,
                    "Territory stored but claim path changed during commit",
                );
            }
            Ok((
                StatusCode::CREATED,
                Json(DataResponse {
                    data: TerritoryView::from(&territory),
                }),
            ))
        }
        Err(err @ CommitError::Validation(_)) => {
            if let Err(e) = state.sessions.mark_rejected(auth.user_id).await {
                tracing::debug!(user_id = auth.user_id, error = %e, "Claim path changed during commit");
            }
            tracing::info!(user_id = auth.user_id, error = %err, "Claim path rejected at commit");
            Err(err.into())
        }
        Err(err) => Err(err.into()),
    }
}
