//! Precise phase of the two-phase overlap test.
//!
//! The bounding-box prefilter runs in the database against the stored boxes;
//! rows that survive it are handed to [`OverlapDetector::conflicting`] for an
//! exact polygon-polygon test.

use geo::{Intersects, LineString, Polygon};

use crate::geodesy::{BoundingBox, Coordinate};

/// Build a `geo` polygon (x = lon, y = lat) from a ring.
pub fn to_geo_polygon(ring: &[Coordinate]) -> Polygon<f64> {
    let exterior: LineString<f64> = ring.iter().map(|c| geo::Coord::from(*c)).collect();
    Polygon::new(exterior, vec![])
}

/// A candidate outline prepared for repeated intersection tests.
#[derive(Debug, Clone)]
pub struct OverlapDetector {
    polygon: Polygon<f64>,
    bbox: Option<BoundingBox>,
}

impl OverlapDetector {
    pub fn new(ring: &[Coordinate]) -> Self {
        Self {
            polygon: to_geo_polygon(ring),
            bbox: BoundingBox::from_coordinates(ring),
        }
    }

    /// Bounding box used for the prefilter query.
    pub fn bbox(&self) -> Option<BoundingBox> {
        self.bbox
    }

    /// Exact test against another outline. Shared edges or vertices count as
    /// an intersection.
    pub fn intersects(&self, other_bbox: &BoundingBox, other_ring: &[Coordinate]) -> bool {
        match &self.bbox {
            Some(b) if b.intersects(other_bbox) => {
                self.polygon.intersects(&to_geo_polygon(other_ring))
            }
            _ => false,
        }
    }

    /// Keep only the items whose outline truly intersects the candidate.
    pub fn conflicting<'a, T, F>(&self, items: &'a [T], outline: F) -> Vec<&'a T>
    where
        F: Fn(&T) -> (BoundingBox, Vec<Coordinate>),
    {
        items
            .iter()
            .filter(|item| {
                let (bbox, ring) = outline(item);
                self.intersects(&bbox, &ring)
            })
            .collect()
    }
}
