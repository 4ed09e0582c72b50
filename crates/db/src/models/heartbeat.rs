//! Models for player presence heartbeats.

use serde::Serialize;
use sqlx::FromRow;
use terraclaim_core::density::PresenceFix;
use terraclaim_core::geodesy::Coordinate;
use terraclaim_core::types::{DbId, Timestamp};

/// A row from the `player_heartbeats` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PlayerHeartbeat {
    pub user_id: DbId,
    pub lat: f64,
    pub lon: f64,
    pub last_seen: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PlayerHeartbeat {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            lat: self.lat,
            lon: self.lon,
        }
    }
}

impl From<&PlayerHeartbeat> for PresenceFix {
    fn from(h: &PlayerHeartbeat) -> Self {
        PresenceFix {
            user_id: h.user_id,
            coordinate: h.coordinate(),
            last_seen: h.last_seen,
        }
    }
}
