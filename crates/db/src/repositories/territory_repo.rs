//! Repository for the `territories` table.
//!
//! Commits run as "check then insert" inside a `SERIALIZABLE` transaction so
//! two concurrent overlapping claims can never both land: the loser either
//! sees the winner's row on retry or is aborted by Postgres with `40001`.

use std::time::Duration;

use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use terraclaim_core::error::ClaimError;
use terraclaim_core::geodesy::{BoundingBox, Coordinate};
use terraclaim_core::lifecycle::{
    claim_blocking_status_ids, LifecycleCutoffs, STATUS_ABANDONED, STATUS_ACTIVE, STATUS_INACTIVE,
};
use terraclaim_core::naming::validate_territory_name;
use terraclaim_core::overlap::OverlapDetector;
use terraclaim_core::polygon::ClaimPolygon;
use terraclaim_core::types::DbId;

use crate::models::territory::{ConflictSummary, CreateTerritory, LifecycleSweepReport, Territory};

/// Column list for territories queries.
const COLUMNS: &str = "id, owner_id, name, ring_lats, ring_lons, area_sq_meters, \
    min_lat, min_lon, max_lat, max_lon, status_id, created_at, last_active_at, updated_at";

/// Maximum rows returned by any territory listing.
pub const MAX_LISTING_LIMIT: i64 = 100;

/// Commit attempts before giving up on serialization failures.
pub const MAX_COMMIT_ATTEMPTS: u32 = 5;

/// Backoff before the first retry; doubles on each subsequent one.
const INITIAL_BACKOFF: Duration = Duration::from_millis(25);

/// SQLSTATE codes worth retrying: serialization_failure, deadlock_detected
/// and lock_not_available (raised when `lock_timeout` fires).
const RETRYABLE_SQLSTATES: [&str; 3] = ["40001", "40P01", "55P03"];

/// Why a commit did not produce a territory.
#[derive(Debug, thiserror::Error)]
pub enum CommitError {
    #[error(transparent)]
    Validation(#[from] ClaimError),

    #[error("{0}")]
    InvalidName(String),

    #[error("Claim overlaps {} existing territories", .0.len())]
    OverlapConflict(Vec<ConflictSummary>),

    #[error("Database error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Commit abandoned after {MAX_COMMIT_ATTEMPTS} attempts due to contention")]
    RetriesExhausted,
}

/// Provides persistence and overlap-guarded commits for territories.
pub struct TerritoryRepo;

impl TerritoryRepo {
    /// Validate and atomically commit a claim.
    ///
    /// Fails with [`CommitError::OverlapConflict`] if the polygon intersects
    /// any active or inactive territory (touching counts). Abandoned
    /// territories never block.
    pub async fn commit(pool: &PgPool, input: &CreateTerritory) -> Result<Territory, CommitError> {
        let polygon = ClaimPolygon::from_ring(&input.ring)?;
        let name = validate_territory_name(input.name.as_deref())
            .map_err(|e| CommitError::InvalidName(e.to_string()))?;

        let mut backoff = INITIAL_BACKOFF;
        for attempt in 1..=MAX_COMMIT_ATTEMPTS {
            match Self::try_commit(pool, input.owner_id, name.as_deref(), &polygon).await {
                Err(CommitError::Storage(e)) if is_retryable(&e) => {
                    tracing::warn!(
                        owner_id = input.owner_id,
                        attempt,
                        error = %e,
                        "Territory commit aborted by contention, retrying",
                    );
                    if attempt < MAX_COMMIT_ATTEMPTS {
                        tokio::time::sleep(backoff).await;
                        backoff *= 2;
                    }
                }
                other => return other,
            }
        }

        tracing::error!(owner_id = input.owner_id, "Territory commit retries exhausted");
        Err(CommitError::RetriesExhausted)
    }

    async fn try_commit(
        pool: &PgPool,
        owner_id: DbId,
        name: Option<&str>,
        polygon: &ClaimPolygon,
    ) -> Result<Territory, CommitError> {
        let mut tx = pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await?;
        sqlx::query("SET LOCAL lock_timeout = '5s'")
            .execute(&mut *tx)
            .await?;

        let conflicts = Self::conflicts_in_tx(&mut tx, polygon.ring(), None).await?;
        if !conflicts.is_empty() {
            tx.rollback().await?;
            return Err(CommitError::OverlapConflict(conflicts));
        }

        let (lats, lons): (Vec<f64>, Vec<f64>) =
            polygon.ring().iter().map(|c| (c.lat, c.lon)).unzip();
        let bbox = polygon.bbox();

        let query = format!(
            "WITH next AS (SELECT nextval(pg_get_serial_sequence('territories', 'id')) AS id) \
             INSERT INTO territories \
                (id, owner_id, name, ring_lats, ring_lons, area_sq_meters, \
                 min_lat, min_lon, max_lat, max_lon, status_id) \
             SELECT next.id, $1, COALESCE($2, 'Territory #' || next.id), $3, $4, $5, \
                    $6, $7, $8, $9, $10 \
             FROM next \
             RETURNING {COLUMNS}"
        );
        let territory = sqlx::query_as::<_, Territory>(&query)
            .bind(owner_id)
            .bind(name)
            .bind(&lats)
            .bind(&lons)
            .bind(polygon.area_sq_meters())
            .bind(bbox.min_lat)
            .bind(bbox.min_lon)
            .bind(bbox.max_lat)
            .bind(bbox.max_lon)
            .bind(STATUS_ACTIVE)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            territory_id = territory.id,
            owner_id,
            area_sq_meters = territory.area_sq_meters,
            "Territory committed",
        );
        Ok(territory)
    }

    /// Bounding-box prefilter followed by the exact polygon test.
    async fn conflicts_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        ring: &[Coordinate],
        exclude_owner: Option<DbId>,
    ) -> Result<Vec<ConflictSummary>, sqlx::Error> {
        let detector = OverlapDetector::new(ring);
        let Some(bbox) = detector.bbox() else {
            return Ok(Vec::new());
        };

        let query = format!(
            "SELECT {COLUMNS} FROM territories \
             WHERE status_id = ANY($1) \
               AND max_lat >= $2 AND min_lat <= $3 \
               AND max_lon >= $4 AND min_lon <= $5 \
               AND ($6::BIGINT IS NULL OR owner_id <> $6) \
             ORDER BY id"
        );
        let candidates = sqlx::query_as::<_, Territory>(&query)
            .bind(claim_blocking_status_ids())
            .bind(bbox.min_lat)
            .bind(bbox.max_lat)
            .bind(bbox.min_lon)
            .bind(bbox.max_lon)
            .bind(exclude_owner)
            .fetch_all(&mut **tx)
            .await?;

        Ok(detector
            .conflicting(&candidates, |t| (t.bbox(), t.ring()))
            .into_iter()
            .map(ConflictSummary::from)
            .collect())
    }

    /// Read-only overlap check for an arbitrary outline, optionally ignoring
    /// one owner's territories.
    pub async fn check_overlap(
        pool: &PgPool,
        ring: &[Coordinate],
        exclude_owner: Option<DbId>,
    ) -> Result<Vec<ConflictSummary>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let conflicts = Self::conflicts_in_tx(&mut tx, ring, exclude_owner).await?;
        tx.commit().await?;
        Ok(conflicts)
    }

    /// Find a territory by its primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Territory>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM territories WHERE id = $1");
        sqlx::query_as::<_, Territory>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Non-abandoned territories whose bounding box intersects `bbox`,
    /// newest first.
    pub async fn list_visible(
        pool: &PgPool,
        bbox: &BoundingBox,
        limit: i64,
    ) -> Result<Vec<Territory>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM territories \
             WHERE status_id <> $1 \
               AND max_lat >= $2 AND min_lat <= $3 \
               AND max_lon >= $4 AND min_lon <= $5 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $6"
        );
        sqlx::query_as::<_, Territory>(&query)
            .bind(STATUS_ABANDONED)
            .bind(bbox.min_lat)
            .bind(bbox.max_lat)
            .bind(bbox.min_lon)
            .bind(bbox.max_lon)
            .bind(limit.clamp(1, MAX_LISTING_LIMIT))
            .fetch_all(pool)
            .await
    }

    /// Non-abandoned territories owned by `owner_id`, newest first.
    pub async fn list_by_owner(
        pool: &PgPool,
        owner_id: DbId,
        limit: i64,
    ) -> Result<Vec<Territory>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM territories \
             WHERE owner_id = $1 AND status_id <> $2 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $3"
        );
        sqlx::query_as::<_, Territory>(&query)
            .bind(owner_id)
            .bind(STATUS_ABANDONED)
            .bind(limit.clamp(1, MAX_LISTING_LIMIT))
            .fetch_all(pool)
            .await
    }

    /// Refresh `last_active_at` and reactivate an inactive territory.
    ///
    /// Returns `None` if the territory does not exist or is abandoned.
    /// Ownership is checked by the caller.
    pub async fn refresh_activity(pool: &PgPool, id: DbId) -> Result<Option<Territory>, sqlx::Error> {
        let query = format!(
            "UPDATE territories SET \
                last_active_at = now(), \
                status_id = $2, \
                updated_at = now() \
             WHERE id = $1 AND status_id <> $3 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Territory>(&query)
            .bind(id)
            .bind(STATUS_ACTIVE)
            .bind(STATUS_ABANDONED)
            .fetch_optional(pool)
            .await
    }

    /// Move stale territories down the lifecycle.
    pub async fn apply_lifecycle(
        pool: &PgPool,
        cutoffs: &LifecycleCutoffs,
    ) -> Result<LifecycleSweepReport, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let abandoned = sqlx::query(
            "UPDATE territories SET status_id = $1, updated_at = now() \
             WHERE status_id <> $1 AND last_active_at <= $2",
        )
        .bind(STATUS_ABANDONED)
        .bind(cutoffs.abandoned_before)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let deactivated = sqlx::query(
            "UPDATE territories SET status_id = $1, updated_at = now() \
             WHERE status_id = $2 AND last_active_at <= $3",
        )
        .bind(STATUS_INACTIVE)
        .bind(STATUS_ACTIVE)
        .bind(cutoffs.inactive_before)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;
        Ok(LifecycleSweepReport {
            deactivated,
            abandoned,
        })
    }

    /// Convenience wrapper over [`apply_lifecycle`](Self::apply_lifecycle)
    /// using the current time.
    pub async fn sweep_lifecycle(pool: &PgPool) -> Result<LifecycleSweepReport, sqlx::Error> {
        Self::apply_lifecycle(pool, &LifecycleCutoffs::at(Utc::now())).await
    }
}

fn is_retryable(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db
            .code()
            .is_some_and(|code| RETRYABLE_SQLSTATES.contains(&&*code)),
        _ => false,
    }
}
