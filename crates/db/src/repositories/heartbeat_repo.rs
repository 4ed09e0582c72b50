//! Repository for the `player_heartbeats` table.

use sqlx::PgPool;
use terraclaim_core::density::OFFLINE_BACKDATE_SECS;
use terraclaim_core::geodesy::{BoundingBox, Coordinate};
use terraclaim_core::types::{DbId, Timestamp};

use crate::models::heartbeat::PlayerHeartbeat;

/// Column list for player_heartbeats queries.
const COLUMNS: &str = "user_id, lat, lon, last_seen, created_at, updated_at";

/// Provides presence tracking for players.
pub struct HeartbeatRepo;

impl HeartbeatRepo {
    /// Record the player's current position with `last_seen = now()`.
    pub async fn upsert(
        pool: &PgPool,
        user_id: DbId,
        position: &Coordinate,
    ) -> Result<PlayerHeartbeat, sqlx::Error> {
        let query = format!(
            "INSERT INTO player_heartbeats (user_id, lat, lon, last_seen) \
             VALUES ($1, $2, $3, now()) \
             ON CONFLICT (user_id) DO UPDATE SET \
                lat = EXCLUDED.lat, \
                lon = EXCLUDED.lon, \
                last_seen = EXCLUDED.last_seen, \
                updated_at = now() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PlayerHeartbeat>(&query)
            .bind(user_id)
            .bind(position.lat)
            .bind(position.lon)
            .fetch_one(pool)
            .await
    }

    /// Back-date the player's heartbeat so they drop out of density counts
    /// immediately. Returns `false` if the player never reported a position.
    pub async fn mark_offline(pool: &PgPool, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE player_heartbeats \
             SET last_seen = now() - make_interval(secs => $2), updated_at = now() \
             WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(OFFLINE_BACKDATE_SECS as f64)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Heartbeats inside `bbox` seen strictly after `since`.
    pub async fn list_online_in_bbox(
        pool: &PgPool,
        bbox: &BoundingBox,
        since: Timestamp,
    ) -> Result<Vec<PlayerHeartbeat>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM player_heartbeats \
             WHERE last_seen > $1 \
               AND lat BETWEEN $2 AND $3 \
               AND lon BETWEEN $4 AND $5"
        );
        sqlx::query_as::<_, PlayerHeartbeat>(&query)
            .bind(since)
            .bind(bbox.min_lat)
            .bind(bbox.max_lat)
            .bind(bbox.min_lon)
            .bind(bbox.max_lon)
            .fetch_all(pool)
            .await
    }
}

