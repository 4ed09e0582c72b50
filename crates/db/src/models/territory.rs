//! Models for committed territories.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use terraclaim_core::geodesy::{BoundingBox, Coordinate};
use terraclaim_core::lifecycle::TerritoryStatus;
use terraclaim_core::types::{DbId, Timestamp};

/// A row from the `territories` table.
#[derive(Debug, Clone, FromRow)]
pub struct Territory {
    pub id: DbId,
    pub owner_id: DbId,
    pub name: String,
    pub ring_lats: Vec<f64>,
    pub ring_lons: Vec<f64>,
    pub area_sq_meters: f64,
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
    pub status_id: DbId,
    pub created_at: Timestamp,
    pub last_active_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Territory {
    /// The stored closed ring.
    pub fn ring(&self) -> Vec<Coordinate> {
        self.ring_lats
            .iter()
            .zip(&self.ring_lons)
            .map(|(&lat, &lon)| Coordinate { lat, lon })
            .collect()
    }

    pub fn bbox(&self) -> BoundingBox {
        BoundingBox {
            min_lat: self.min_lat,
            min_lon: self.min_lon,
            max_lat: self.max_lat,
            max_lon: self.max_lon,
        }
    }

    /// Unknown status IDs are treated as active so they keep blocking claims.
    pub fn status(&self) -> TerritoryStatus {
        TerritoryStatus::from_id(self.status_id).unwrap_or(TerritoryStatus::Active)
    }
}

/// API view of a territory with its full geometry.
#[derive(Debug, Clone, Serialize)]
pub struct TerritoryView {
    pub id: DbId,
    pub owner_id: DbId,
    pub name: String,
    pub area_sq_meters: f64,
    pub status: TerritoryStatus,
    pub geometry: Vec<Coordinate>,
    pub created_at: Timestamp,
    pub last_active_at: Timestamp,
}

impl From<&Territory> for TerritoryView {
    fn from(t: &Territory) -> Self {
        Self {
            id: t.id,
            owner_id: t.owner_id,
            name: t.name.clone(),
            area_sq_meters: t.area_sq_meters,
            status: t.status(),
            geometry: t.ring(),
            created_at: t.created_at,
            last_active_at: t.last_active_at,
        }
    }
}

/// A conflicting territory as reported to a claimant: identity, owner, name
/// and area, never the outline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConflictSummary {
    pub id: DbId,
    pub owner_id: DbId,
    pub name: String,
    pub area_sq_meters: f64,
}

impl From<&Territory> for ConflictSummary {
    fn from(t: &Territory) -> Self {
        Self {
            id: t.id,
            owner_id: t.owner_id,
            name: t.name.clone(),
            area_sq_meters: t.area_sq_meters,
        }
    }
}

/// DTO for committing a claim.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTerritory {
    pub owner_id: DbId,
    pub name: Option<String>,
    /// Outline as walked or drawn; closed or open, it is normalised on commit.
    pub ring: Vec<Coordinate>,
}

/// Counts returned by a lifecycle sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LifecycleSweepReport {
    pub deactivated: u64,
    pub abandoned: u64,
}
