//! Territory activity lifecycle: `active -> inactive -> abandoned`.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

/// Days without an activity refresh before an active territory goes inactive.
pub const INACTIVE_AFTER_DAYS: i64 = 30;

/// Days without an activity refresh before a territory is abandoned and
/// becomes reclaimable.
pub const ABANDONED_AFTER_DAYS: i64 = 90;

/// Status IDs matching `territory_statuses` seed data.
pub const STATUS_ACTIVE: DbId = 1;
pub const STATUS_INACTIVE: DbId = 2;
pub const STATUS_ABANDONED: DbId = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerritoryStatus {
    Active,
    Inactive,
    Abandoned,
}

impl TerritoryStatus {
    pub const ALL: [TerritoryStatus; 3] = [
        TerritoryStatus::Active,
        TerritoryStatus::Inactive,
        TerritoryStatus::Abandoned,
    ];

    pub fn id(self) -> DbId {
        match self {
            TerritoryStatus::Active => STATUS_ACTIVE,
            TerritoryStatus::Inactive => STATUS_INACTIVE,
            TerritoryStatus::Abandoned => STATUS_ABANDONED,
        }
    }

    pub fn from_id(id: DbId) -> Option<Self> {
        match id {
            STATUS_ACTIVE => Some(TerritoryStatus::Active),
            STATUS_INACTIVE => Some(TerritoryStatus::Inactive),
            STATUS_ABANDONED => Some(TerritoryStatus::Abandoned),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TerritoryStatus::Active => "active",
            TerritoryStatus::Inactive => "inactive",
            TerritoryStatus::Abandoned => "abandoned",
        }
    }

    /// Whether a territory in this status blocks new overlapping claims.
    ///
    /// Inactive territories still hold their ground so that a later activity
    /// refresh can never reactivate two intersecting outlines.
    pub fn blocks_claims(self) -> bool {
        !matches!(self, TerritoryStatus::Abandoned)
    }
}

/// IDs of every status whose territories block overlapping claims.
pub fn claim_blocking_status_ids() -> Vec<DbId> {
    TerritoryStatus::ALL
        .into_iter()
        .filter(|s| s.blocks_claims())
        .map(TerritoryStatus::id)
        .collect()
}

/// Cutoffs used by the periodic lifecycle sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleCutoffs {
    /// Active territories last refreshed before this go inactive.
    pub inactive_before: Timestamp,
    /// Non-abandoned territories last refreshed before this are abandoned.
    pub abandoned_before: Timestamp,
}

impl LifecycleCutoffs {
    pub fn at(now: Timestamp) -> Self {
        Self {
            inactive_before: now - Duration::days(INACTIVE_AFTER_DAYS),
            abandoned_before: now - Duration::days(ABANDONED_AFTER_DAYS),
        }
    }
}
