//! Handlers for committed territories: direct commit, map queries, overlap
//! preview and activity refresh.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use terraclaim_core::error::CoreError;
use terraclaim_core::geodesy::{BoundingBox, Coordinate};
use terraclaim_core::lifecycle::TerritoryStatus;
use terraclaim_core::polygon::MAX_CLAIM_VERTICES;
use terraclaim_core::simplify::{DetailBucket, MAX_DETAIL_LEVEL};
use terraclaim_core::types::DbId;
use terraclaim_db::models::territory::{CreateTerritory, Territory, TerritoryView};
use terraclaim_db::repositories::territory_repo::MAX_LISTING_LIMIT;
use terraclaim_db::repositories::TerritoryRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Upper bound on vertices accepted in a client-supplied outline; one spare
/// for a closing vertex.
const MAX_POLYGON_VERTICES: u64 = MAX_CLAIM_VERTICES as u64 + 1;

#[derive(Debug, Deserialize, Validate)]
pub struct CommitTerritoryRequest {
    #[validate(length(min = 3, max = MAX_POLYGON_VERTICES))]
    pub polygon: Vec<Coordinate>,
    #[validate(length(max = 64))]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct OverlapCheckRequest {
    #[validate(length(min = 3, max = MAX_POLYGON_VERTICES))]
    pub polygon: Vec<Coordinate>,
    pub exclude_owner: Option<DbId>,
}

/// Map viewport (`?min_lat=&min_lon=&max_lat=&max_lon=&detail_level=`).
#[derive(Debug, Deserialize)]
pub struct VisibleParams {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
    pub detail_level: Option<u32>,
}

impl VisibleParams {
    fn bbox(&self) -> AppResult<BoundingBox> {
        let bbox = BoundingBox {
            min_lat: self.min_lat,
            min_lon: self.min_lon,
            max_lat: self.max_lat,
            max_lon: self.max_lon,
        };
        if !bbox.is_valid() {
            return Err(AppError::BadRequest(
                "Bounding box must satisfy min <= max within WGS-84 range".into(),
            ));
        }
        Ok(bbox)
    }

    fn bucket(&self) -> DetailBucket {
        let level = self
            .detail_level
            .map_or(MAX_DETAIL_LEVEL, |l| l.min(u32::from(MAX_DETAIL_LEVEL)) as u8);
        DetailBucket::from_level(level)
    }
}

/// A territory as drawn on the map, with geometry simplified for the
/// requested detail level.
#[derive(Debug, Serialize)]
pub struct VisibleTerritory {
    pub id: DbId,
    pub owner_id: DbId,
    pub name: String,
    pub area_sq_meters: f64,
    pub status: TerritoryStatus,
    pub detail: DetailBucket,
    pub geometry: Vec<Coordinate>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn ensure_territory_exists(pool: &sqlx::PgPool, id: DbId) -> AppResult<Territory> {
    TerritoryRepo::find_by_id(pool, id).await?.ok_or(AppError::Core(CoreError::NotFound {
        entity: "Territory",
        id,
    }))
}

fn views(territories: &[Territory]) -> Vec<TerritoryView> {
    territories.iter().map(TerritoryView::from).collect()
}

// ---------------------------------------------------------------------------
// POST /territories
// ---------------------------------------------------------------------------

/// Commit an explicit outline for the caller.
pub async fn commit_territory(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CommitTerritoryRequest>,
) -> AppResult<impl IntoResponse> {
    body.validate()?;

    let input = CreateTerritory {
        owner_id: auth.user_id,
        name: body.name,
        ring: body.polygon,
    };
    let territory = TerritoryRepo::commit(&state.pool, &input).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: TerritoryView::from(&territory),
        }),
    ))
}

// ---------------------------------------------------------------------------
// GET /territories/visible
// ---------------------------------------------------------------------------

/// Newest non-abandoned territories in the viewport, simplified.
pub async fn list_visible(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<VisibleParams>,
) -> AppResult<impl IntoResponse> {
    let bbox = params.bbox()?;
    let bucket = params.bucket();

    let territories = TerritoryRepo::list_visible(&state.pool, &bbox, MAX_LISTING_LIMIT).await?;

    let mut visible = Vec::with_capacity(territories.len());
    for t in &territories {
        let geometry = state
            .simplification_cache
            .get_or_simplify(t.id, bucket, &t.ring())
            .await;
        visible.push(VisibleTerritory {
            id: t.id,
            owner_id: t.owner_id,
            name: t.name.clone(),
            area_sq_meters: t.area_sq_meters,
            status: t.status(),
            detail: bucket,
            geometry: geometry.to_vec(),
        });
    }

    tracing::debug!(count = visible.len(), ?bucket, "Listed visible territories");
    Ok(Json(DataResponse { data: visible }))
}

// ---------------------------------------------------------------------------
// POST /territories/overlap-check
// ---------------------------------------------------------------------------

/// Preview which territories an outline would conflict with.
pub async fn overlap_check(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(body): Json<OverlapCheckRequest>,
) -> AppResult<impl IntoResponse> {
    body.validate()?;
    if !body.polygon.iter().all(Coordinate::is_valid) {
        return Err(AppError::BadRequest(
            "Polygon coordinates must be finite and within WGS-84 range".into(),
        ));
    }

    let conflicts =
        TerritoryRepo::check_overlap(&state.pool, &body.polygon, body.exclude_owner).await?;
    Ok(Json(DataResponse { data: conflicts }))
}

// ---------------------------------------------------------------------------
// GET /territories/mine
// ---------------------------------------------------------------------------

pub async fn list_mine(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<impl IntoResponse> {
    let territories =
        TerritoryRepo::list_by_owner(&state.pool, auth.user_id, MAX_LISTING_LIMIT).await?;
    Ok(Json(DataResponse {
        data: views(&territories),
    }))
}

// ---------------------------------------------------------------------------
// GET /users/{id}/territories
// ---------------------------------------------------------------------------

pub async fn list_for_user(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(user_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let territories = TerritoryRepo::list_by_owner(&state.pool, user_id, MAX_LISTING_LIMIT).await?;
    Ok(Json(DataResponse {
        data: views(&territories),
    }))
}

// ---------------------------------------------------------------------------
// POST /territories/{id}/activity
// ---------------------------------------------------------------------------

/// Refresh a territory's activity. Owner only; abandoned territories are
/// gone for good.
pub async fn refresh_activity(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let territory = ensure_territory_exists(&state.pool, id).await?;
    if territory.owner_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the owner can refresh a territory".into(),
        )));
    }

    let refreshed = TerritoryRepo::refresh_activity(&state.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Abandoned territories cannot be refreshed".into(),
            ))
        })?;

    tracing::info!(territory_id = id, user_id = auth.user_id, "Territory activity refreshed");
    Ok(Json(DataResponse {
        data: TerritoryView::from(&refreshed),
    }))
}
