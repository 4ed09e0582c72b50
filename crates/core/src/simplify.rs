//! Detail-level geometry simplification for map views.
//!
//! Simplification is a pure function of (ring, detail level). Coarser levels
//! are derived from finer ones, so vertex count never grows as the detail
//! level drops, and every step is checked so the output stays a simple ring.

use geo::{LineString, Simplify};
use serde::{Deserialize, Serialize};

use crate::geodesy::Coordinate;
use crate::polygon::is_simple_ring;

/// Highest detail level accepted; larger requests are clamped.
pub const MAX_DETAIL_LEVEL: u8 = 22;

/// How many times a rejected simplification step halves its tolerance before
/// giving up and keeping the input.
const MAX_TOLERANCE_HALVINGS: u32 = 6;

/// Tolerance bands keyed by detail level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailBucket {
    /// Level >= 17, no simplification.
    Full,
    /// Levels 15-16.
    Fine,
    /// Levels 13-14.
    Medium,
    /// Levels below 13.
    Coarse,
}

impl DetailBucket {
    pub fn from_level(level: u8) -> Self {
        match level.min(MAX_DETAIL_LEVEL) {
            17..=u8::MAX => DetailBucket::Full,
            15..=16 => DetailBucket::Fine,
            13..=14 => DetailBucket::Medium,
            _ => DetailBucket::Coarse,
        }
    }

    /// Simplification tolerance in degrees.
    pub fn tolerance(self) -> f64 {
        match self {
            DetailBucket::Full => 0.0,
            DetailBucket::Fine => 0.000_01,
            DetailBucket::Medium => 0.000_1,
            DetailBucket::Coarse => 0.001,
        }
    }

    /// Buckets from finest to `self`, inclusive.
    fn chain(self) -> impl Iterator<Item = DetailBucket> {
        [
            DetailBucket::Full,
            DetailBucket::Fine,
            DetailBucket::Medium,
            DetailBucket::Coarse,
        ]
        .into_iter()
        .take_while(move |b| *b <= self)
    }
}

pub fn tolerance_for_level(level: u8) -> f64 {
    DetailBucket::from_level(level).tolerance()
}

/// Simplify a closed ring for display at `level`.
pub fn simplify_ring(ring: &[Coordinate], level: u8) -> Vec<Coordinate> {
    simplify_for_bucket(ring, DetailBucket::from_level(level))
}

pub fn simplify_for_bucket(ring: &[Coordinate], bucket: DetailBucket) -> Vec<Coordinate> {
    bucket
        .chain()
        .fold(ring.to_vec(), |current, b| simplify_step(current, b.tolerance()))
}

/// One Douglas-Peucker pass that must leave a valid ring behind.
///
/// If the result degenerates or crosses itself the tolerance is halved and
/// the pass retried; after [`MAX_TOLERANCE_HALVINGS`] attempts the input is
/// returned unchanged.
fn simplify_step(ring: Vec<Coordinate>, tolerance: f64) -> Vec<Coordinate> {
    if tolerance <= 0.0 || ring.len() <= 4 {
        return ring;
    }

    let line: LineString<f64> = ring.iter().map(|c| geo::Coord::from(*c)).collect();
    let mut epsilon = tolerance;
    for _ in 0..=MAX_TOLERANCE_HALVINGS {
        let candidate: Vec<Coordinate> = line
            .simplify(&epsilon)
            .into_inner()
            .into_iter()
            .map(Coordinate::from)
            .collect();
        if candidate.len() >= 4 && candidate.first() == candidate.last() && is_simple_ring(&candidate)
        {
            return candidate;
        }
        epsilon /= 2.0;
    }
    ring
}
