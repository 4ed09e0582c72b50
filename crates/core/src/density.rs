//! Player-density estimation for scaling spawned points of interest.
//!
//! "Online" is derived from `last_seen` at query time; nothing here stores a
//! presence flag.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::geodesy::Coordinate;
use crate::types::{DbId, Timestamp};

/// A heartbeat older than this is treated as offline.
pub const ONLINE_WINDOW_SECS: i64 = 5 * 60;

/// How far `mark offline` back-dates a heartbeat.
pub const OFFLINE_BACKDATE_SECS: i64 = 60 * 60;

/// Largest accepted search radius for a density query.
pub const MAX_DENSITY_RADIUS_METERS: f64 = 50_000.0;

/// One player's latest reported position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PresenceFix {
    pub user_id: DbId,
    pub coordinate: Coordinate,
    pub last_seen: Timestamp,
}

/// `now - last_seen < ONLINE_WINDOW_SECS`.
pub fn is_online(last_seen: Timestamp, now: Timestamp) -> bool {
    now - last_seen < Duration::seconds(ONLINE_WINDOW_SECS)
}

/// Oldest `last_seen` still considered online at `now`.
pub fn online_cutoff(now: Timestamp) -> Timestamp {
    now - Duration::seconds(ONLINE_WINDOW_SECS)
}

/// Count online players within `radius_meters` of `center`, excluding the
/// requester.
pub fn nearby_count(
    center: &Coordinate,
    radius_meters: f64,
    excluding_user: DbId,
    fixes: &[PresenceFix],
    now: Timestamp,
) -> usize {
    fixes
        .iter()
        .filter(|f| f.user_id != excluding_user)
        .filter(|f| is_online(f.last_seen, now))
        .filter(|f| center.distance_to(&f.coordinate) <= radius_meters)
        .count()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnTier {
    Alone,
    Low,
    Medium,
    High,
}

impl SpawnTier {
    /// Suggested number of points of interest to spawn.
    pub fn spawn_count(self) -> u32 {
        match self {
            SpawnTier::Alone => 1,
            SpawnTier::Low => 3,
            SpawnTier::Medium => 6,
            SpawnTier::High => 99,
        }
    }
}

/// Map a nearby-player count to a tier. Lower bounds are inclusive.
pub fn suggest_spawn_tier(count: usize) -> SpawnTier {
    match count {
        0 => SpawnTier::Alone,
        1..=5 => SpawnTier::Low,
        6..=20 => SpawnTier::Medium,
        _ => SpawnTier::High,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DensitySuggestion {
    pub nearby_count: usize,
    pub tier: SpawnTier,
    pub suggested_spawn_count: u32,
}

impl DensitySuggestion {
    pub fn from_count(nearby_count: usize) -> Self {
        let tier = suggest_spawn_tier(nearby_count);
        Self {
            nearby_count,
            tier,
            suggested_spawn_count: tier.spawn_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 6, 1, 18, 0, 0).unwrap()
    }

    fn fix(user_id: DbId, c: Coordinate, secs_ago: i64) -> PresenceFix {
        PresenceFix {
            user_id,
            coordinate: c,
            last_seen: now() - Duration::seconds(secs_ago),
        }
    }

    #[test]
    fn eight_nearby_is_medium_with_six_spawns() {
        let s = DensitySuggestion::from_count(8);
        assert_eq!(s.tier, SpawnTier::Medium);
        assert_eq!(s.suggested_spawn_count, 6);
    }

    #[test]
    fn tier_boundaries() {
        assert_eq!(suggest_spawn_tier(0), SpawnTier::Alone);
        assert_eq!(suggest_spawn_tier(1), SpawnTier::Low);
        assert_eq!(suggest_spawn_tier(5), SpawnTier::Low);
        assert_eq!(suggest_spawn_tier(6), SpawnTier::Medium);
        assert_eq!(suggest_spawn_tier(20), SpawnTier::Medium);
        assert_eq!(suggest_spawn_tier(21), SpawnTier::High);
        assert_eq!(SpawnTier::High.spawn_count(), 99);
        assert_eq!(SpawnTier::Alone.spawn_count(), 1);
    }

    #[test]
    fn tier_and_spawn_count_are_monotonic() {
        let mut prev_tier = SpawnTier::Alone;
        let mut prev_spawn = 0;
        for count in 0..200 {
            let s = DensitySuggestion::from_count(count);
            assert!(s.tier >= prev_tier, "tier dropped at {count}");
            assert!(s.suggested_spawn_count >= prev_spawn, "spawn dropped at {count}");
            prev_tier = s.tier;
            prev_spawn = s.suggested_spawn_count;
        }
    }

    #[test]
    fn online_window_is_strict() {
        assert!(is_online(now() - Duration::seconds(299), now()));
        assert!(!is_online(now() - Duration::seconds(300), now()));
        assert!(!is_online(now() - Duration::seconds(OFFLINE_BACKDATE_SECS), now()));
    }

    #[test]
    fn nearby_count_filters_requester_offline_and_distant() {
        let center = Coordinate::new(35.0, 139.0);
        let fixes = [
            fix(1, center, 10),                             // requester
            fix(2, center.offset_meters(100.0, 0.0), 30),   // counted
            fix(3, center.offset_meters(0.0, -450.0), 200), // counted
            fix(4, center.offset_meters(10.0, 10.0), 600),  // offline
            fix(5, center.offset_meters(800.0, 0.0), 5),    // too far
        ];
        assert_eq!(nearby_count(&center, 500.0, 1, &fixes, now()), 2);
        assert_eq!(nearby_count(&center, 1_000.0, 1, &fixes, now()), 3);
        assert_eq!(nearby_count(&center, 1_000.0, 99, &fixes, now()), 4);
    }
}
