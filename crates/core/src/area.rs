//! Planar ring area in square meters.
//!
//! Shoelace formula over raw degree coordinates, scaled by
//! [`METERS_PER_DEGREE`] squared. Longitude degrees are not corrected for
//! latitude, so the figure drifts from true area away from the equator and
//! for large rings. Claims are capped well below the size where this matters
//! for gameplay.

use crate::error::ClaimError;
use crate::geodesy::{Coordinate, METERS_PER_DEGREE};

pub const MIN_CLAIM_AREA_SQ_METERS: f64 = 500.0;
pub const MAX_CLAIM_AREA_SQ_METERS: f64 = 100_000.0;

/// Signed shoelace sum over the ring, in square degrees.
///
/// Positive for counter-clockwise rings (lon as x, lat as y). Accepts open or
/// closed rings: a repeated closing vertex contributes nothing.
pub fn signed_area_sq_degrees(ring: &[Coordinate]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let twice: f64 = ring
        .iter()
        .zip(ring.iter().cycle().skip(1))
        .map(|(a, b)| a.lon * b.lat - b.lon * a.lat)
        .sum();
    twice / 2.0
}

/// Enclosed area of the ring in approximate square meters.
pub fn ring_area_sq_meters(ring: &[Coordinate]) -> f64 {
    signed_area_sq_degrees(ring).abs() * METERS_PER_DEGREE * METERS_PER_DEGREE
}

/// Finalization bounds check: the area must lie in
/// `[MIN_CLAIM_AREA_SQ_METERS, MAX_CLAIM_AREA_SQ_METERS]`.
pub fn check_area_bounds(area_sq_meters: f64) -> Result<(), ClaimError> {
    if (MIN_CLAIM_AREA_SQ_METERS..=MAX_CLAIM_AREA_SQ_METERS).contains(&area_sq_meters) {
        Ok(())
    } else {
        Err(ClaimError::AreaOutOfBounds {
            area_sq_meters,
            min_sq_meters: MIN_CLAIM_AREA_SQ_METERS,
            max_sq_meters: MAX_CLAIM_AREA_SQ_METERS,
        })
    }
}
