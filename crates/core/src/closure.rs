//! Loop-closure detection for a recorded path.

use crate::error::ClaimError;
use crate::geodesy::Coordinate;
use crate::validator::TrackPoint;

/// Minimum number of accepted points before a path may close.
pub const MIN_CLOSURE_POINTS: usize = 3;

/// The end of the path must come back within this distance of its start.
pub const MAX_CLOSURE_GAP_METERS: f64 = 30.0;

/// Distance in meters between the first and last point, if there are any.
pub fn closure_gap_meters(points: &[TrackPoint]) -> Option<f64> {
    let first = points.first()?;
    let last = points.last()?;
    Some(first.coordinate.distance_to(&last.coordinate))
}

/// Typed closure check; `Ok` means the path has looped back on itself.
pub fn check_closure(points: &[TrackPoint]) -> Result<(), ClaimError> {
    if points.len() < MIN_CLOSURE_POINTS {
        return Err(ClaimError::IncompletePath {
            required: MIN_CLOSURE_POINTS,
            actual: points.len(),
        });
    }
    let gap_meters = closure_gap_meters(points).unwrap_or(f64::INFINITY);
    if gap_meters >= MAX_CLOSURE_GAP_METERS {
        return Err(ClaimError::ClosureTooFar {
            gap_meters,
            max_meters: MAX_CLOSURE_GAP_METERS,
        });
    }
    Ok(())
}

pub fn is_closeable(points: &[TrackPoint]) -> bool {
    check_closure(points).is_ok()
}

/// Complete the ring by repeating the first point at the end.
///
/// A path that already ends exactly on its start is not given a duplicate
/// closing vertex.
pub fn close_ring(points: &[TrackPoint]) -> Vec<Coordinate> {
    let mut ring: Vec<Coordinate> = points.iter().map(|p| p.coordinate).collect();
    if let (Some(&first), Some(&last)) = (ring.first(), ring.last()) {
        if ring.len() > 1 && first != last {
            ring.push(first);
        }
    }
    ring
}
