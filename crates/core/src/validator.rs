//! Per-sample anti-cheat validation for an in-progress claim path.
//!
//! A new fix is judged only against the previously accepted point. The model
//! is heuristic: it catches GPS snapping, vehicles, and replayed tracks, but
//! is not a proof of location.

use serde::{Deserialize, Serialize};

use crate::geodesy::Coordinate;
use crate::types::Timestamp;

/// Fastest plausible human-powered movement (walking, running, cycling).
pub const MAX_SPEED_KMH: f64 = 15.0;

/// A jump longer than this within [`TELEPORT_WINDOW_SECS`] is a discontinuity.
pub const TELEPORT_DISTANCE_METERS: f64 = 100.0;

pub const TELEPORT_WINDOW_SECS: f64 = 5.0;

/// Gap after which the path is considered to have lost continuity.
pub const MAX_SAMPLE_GAP_SECS: f64 = 60.0;

/// One raw location fix as reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    pub coordinate: Coordinate,
    pub timestamp: Timestamp,
    /// Reported horizontal accuracy radius in meters.
    pub accuracy_meters: f64,
}

/// An accepted point of a candidate path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    pub coordinate: Coordinate,
    pub recorded_at: Timestamp,
}

impl From<&LocationSample> for TrackPoint {
    fn from(sample: &LocationSample) -> Self {
        TrackPoint {
            coordinate: sample.coordinate,
            recorded_at: sample.timestamp,
        }
    }
}

/// Thresholds applied by [`validate_sample`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    pub max_speed_kmh: f64,
    pub teleport_distance_meters: f64,
    pub teleport_window_secs: f64,
    pub max_gap_secs: f64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_speed_kmh: MAX_SPEED_KMH,
            teleport_distance_meters: TELEPORT_DISTANCE_METERS,
            teleport_window_secs: TELEPORT_WINDOW_SECS,
            max_gap_secs: MAX_SAMPLE_GAP_SECS,
        }
    }
}

/// Why a sample was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Implied speed above the allowed ceiling.
    ExcessiveSpeed,
    /// A jump too large for the elapsed time, or a timestamp that does not
    /// move forward.
    Discontinuity,
    /// Too long since the previous accepted point.
    Stale,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::ExcessiveSpeed => "excessive_speed",
            RejectReason::Discontinuity => "discontinuity",
            RejectReason::Stale => "stale",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", content = "reason", rename_all = "snake_case")]
pub enum SampleVerdict {
    Accept,
    Reject(RejectReason),
}

/// Judge `sample` against the previously accepted point.
///
/// A sample whose timestamp is not after the previous point's is a
/// discontinuity. A sample more than `max_gap_secs` after the previous point
/// is stale regardless of distance: the previous point no longer anchors the
/// path, so speed and teleport are not judged against it. Otherwise speed,
/// then teleport. The first point of a path (`previous == None`) is always
/// accepted.
pub fn validate_sample(
    previous: Option<&TrackPoint>,
    sample: &LocationSample,
    config: &ValidatorConfig,
) -> SampleVerdict {
    let Some(prev) = previous else {
        return SampleVerdict::Accept;
    };

    let elapsed_secs = (sample.timestamp - prev.recorded_at).num_milliseconds() as f64 / 1000.0;
    if elapsed_secs <= 0.0 {
        return SampleVerdict::Reject(RejectReason::Discontinuity);
    }

    if elapsed_secs > config.max_gap_secs {
        return SampleVerdict::Reject(RejectReason::Stale);
    }

    let distance = prev.coordinate.distance_to(&sample.coordinate);
    let speed_kmh = distance / elapsed_secs * 3.6;

    if speed_kmh > config.max_speed_kmh {
        return SampleVerdict::Reject(RejectReason::ExcessiveSpeed);
    }

    if distance > config.teleport_distance_meters && elapsed_secs < config.teleport_window_secs {
        return SampleVerdict::Reject(RejectReason::Discontinuity);
    }

    SampleVerdict::Accept
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap()
    }

    fn point(c: Coordinate) -> TrackPoint {
        TrackPoint { coordinate: c, recorded_at: t0() }
    }

    fn sample_after(c: Coordinate, millis: i64) -> LocationSample {
        LocationSample {
            coordinate: c,
            timestamp: t0() + Duration::milliseconds(millis),
            accuracy_meters: 5.0,
        }
    }

    #[test]
    fn first_point_is_always_accepted() {
        let s = sample_after(Coordinate::new(10.0, 10.0), 0);
        assert_eq!(validate_sample(None, &s, &ValidatorConfig::default()), SampleVerdict::Accept);
    }

    #[test]
    fn walking_pace_is_accepted() {
        let origin = Coordinate::new(40.0, -74.0);
        // 14 m in 10 s is about 5 km/h.
        let s = sample_after(origin.offset_meters(14.0, 0.0), 10_000);
        assert_eq!(
            validate_sample(Some(&point(origin)), &s, &ValidatorConfig::default()),
            SampleVerdict::Accept
        );
    }

    #[test]
    fn excessive_speed_is_rejected_in_every_direction() {
        let origin = Coordinate::new(40.0, -74.0);
        // 60 m in 10 s is about 21.6 km/h.
        for (n, e) in [(60.0, 0.0), (-60.0, 0.0), (0.0, 60.0), (0.0, -60.0), (-42.5, 42.5)] {
            let s = sample_after(origin.offset_meters(n, e), 10_000);
            assert_eq!(
                validate_sample(Some(&point(origin)), &s, &ValidatorConfig::default()),
                SampleVerdict::Reject(RejectReason::ExcessiveSpeed),
                "direction ({n}, {e})"
            );
        }
    }

    #[test]
    fn teleport_is_rejected_with_default_thresholds() {
        let origin = Coordinate::new(40.0, -74.0);
        let s = sample_after(origin.offset_meters(150.0, 0.0), 3_000);
        let verdict = validate_sample(Some(&point(origin)), &s, &ValidatorConfig::default());
        assert!(matches!(verdict, SampleVerdict::Reject(_)));
    }

    #[test]
    fn teleport_rule_applies_independently_of_speed_ceiling() {
        // Even with a ceiling high enough for a car, a 150 m jump in 3 s is a snap.
        let config = ValidatorConfig {
            max_speed_kmh: 500.0,
            ..ValidatorConfig::default()
        };
        let origin = Coordinate::new(40.0, -74.0);
        let s = sample_after(origin.offset_meters(150.0, 0.0), 3_000);
        assert_eq!(
            validate_sample(Some(&point(origin)), &s, &config),
            SampleVerdict::Reject(RejectReason::Discontinuity)
        );

        // Same distance over 6 s is outside the teleport window.
        let s = sample_after(origin.offset_meters(150.0, 0.0), 6_000);
        assert_eq!(validate_sample(Some(&point(origin)), &s, &config), SampleVerdict::Accept);
    }

    #[test]
    fn non_increasing_timestamp_is_a_discontinuity() {
        let origin = Coordinate::new(40.0, -74.0);
        let same_time = sample_after(origin, 0);
        let earlier = sample_after(origin, -1_000);
        let cfg = ValidatorConfig::default();
        assert_eq!(
            validate_sample(Some(&point(origin)), &same_time, &cfg),
            SampleVerdict::Reject(RejectReason::Discontinuity)
        );
        assert_eq!(
            validate_sample(Some(&point(origin)), &earlier, &cfg),
            SampleVerdict::Reject(RejectReason::Discontinuity)
        );
    }

    #[test]
    fn long_gap_is_stale() {
        let origin = Coordinate::new(40.0, -74.0);
        let s = sample_after(origin.offset_meters(20.0, 0.0), 61_000);
        assert_eq!(
            validate_sample(Some(&point(origin)), &s, &ValidatorConfig::default()),
            SampleVerdict::Reject(RejectReason::Stale)
        );
        let s = sample_after(origin.offset_meters(20.0, 0.0), 60_000);
        assert_eq!(
            validate_sample(Some(&point(origin)), &s, &ValidatorConfig::default()),
            SampleVerdict::Accept
        );
    }

    #[test]
    fn long_gap_is_stale_even_after_fast_travel() {
        // 1 km in 120 s is 30 km/h, but the gap outranks the speed rule.
        let origin = Coordinate::new(40.0, -74.0);
        let s = sample_after(origin.offset_meters(1_000.0, 0.0), 120_000);
        assert_eq!(
            validate_sample(Some(&point(origin)), &s, &ValidatorConfig::default()),
            SampleVerdict::Reject(RejectReason::Stale)
        );
    }
}
