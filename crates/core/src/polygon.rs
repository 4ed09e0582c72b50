//! Validated claim outlines.
//!
//! Every polygon that reaches the territory store, whether it came from a
//! server-held path or straight from a client, goes through
//! [`ClaimPolygon::from_ring`].

use geo::line_intersection::{line_intersection, LineIntersection};
use geo::Line;
use serde::Serialize;

use crate::area::{check_area_bounds, ring_area_sq_meters};
use crate::error::ClaimError;
use crate::geodesy::{BoundingBox, Coordinate};

/// Most distinct vertices a claim outline may have. Keeps the quadratic
/// simplicity check bounded.
pub const MAX_CLAIM_VERTICES: usize = 2_000;

/// A closed, simple ring with its area and bounding box precomputed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaimPolygon {
    ring: Vec<Coordinate>,
    area_sq_meters: f64,
    bbox: BoundingBox,
}

impl ClaimPolygon {
    /// Normalise and validate a ring.
    ///
    /// Consecutive duplicate vertices are dropped and the ring is closed
    /// (first == last). Fails on malformed coordinates, fewer than three or
    /// more than [`MAX_CLAIM_VERTICES`] distinct vertices, self-intersection,
    /// or an area outside claim bounds.
    pub fn from_ring(coords: &[Coordinate]) -> Result<Self, ClaimError> {
        if let Some(bad) = coords.iter().find(|c| !c.is_valid()) {
            return Err(ClaimError::InvalidGeometry(format!(
                "coordinate ({}, {}) is not a valid WGS-84 position",
                bad.lat, bad.lon
            )));
        }

        let ring = normalise_ring(coords);
        let distinct = ring.len().saturating_sub(1);
        if distinct < 3 {
            return Err(ClaimError::InvalidGeometry(format!(
                "ring needs at least 3 distinct vertices, has {distinct}"
            )));
        }
        if distinct > MAX_CLAIM_VERTICES {
            return Err(ClaimError::InvalidGeometry(format!(
                "ring has {distinct} vertices; at most {MAX_CLAIM_VERTICES} allowed"
            )));
        }

        if !is_simple_ring(&ring) {
            return Err(ClaimError::SelfIntersecting);
        }

        let area_sq_meters = ring_area_sq_meters(&ring);
        check_area_bounds(area_sq_meters)?;

        let bbox = BoundingBox::from_coordinates(&ring)
            .ok_or_else(|| ClaimError::InvalidGeometry("empty ring".into()))?;

        Ok(Self {
            ring,
            area_sq_meters,
            bbox,
        })
    }

    /// Closed ring; the last vertex repeats the first.
    pub fn ring(&self) -> &[Coordinate] {
        &self.ring
    }

    pub fn area_sq_meters(&self) -> f64 {
        self.area_sq_meters
    }

    pub fn bbox(&self) -> BoundingBox {
        self.bbox
    }
}

/// Drop consecutive duplicates and close the ring.
pub fn normalise_ring(coords: &[Coordinate]) -> Vec<Coordinate> {
    let mut ring: Vec<Coordinate> = Vec::with_capacity(coords.len() + 1);
    for c in coords {
        if ring.last() != Some(c) {
            ring.push(*c);
        }
    }
    while ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    if let Some(&first) = ring.first() {
        ring.push(first);
    }
    ring
}

/// `true` if no two edges of the closed ring cross or overlap.
///
/// Adjacent edges may share their common vertex but must not fold back along
/// each other. The ring must already be closed.
pub fn is_simple_ring(ring: &[Coordinate]) -> bool {
    let edges: Vec<Line<f64>> = ring
        .windows(2)
        .map(|w| Line::new(geo::Coord::from(w[0]), geo::Coord::from(w[1])))
        .collect();
    let n = edges.len();
    if n < 3 {
        return false;
    }

    for i in 0..n {
        for j in (i + 1)..n {
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            match line_intersection(edges[i], edges[j]) {
                None => {}
                Some(LineIntersection::Collinear { .. }) => return false,
                Some(LineIntersection::SinglePoint { .. }) if adjacent => {}
                Some(LineIntersection::SinglePoint { .. }) => return false,
            }
        }
    }
    true
}
