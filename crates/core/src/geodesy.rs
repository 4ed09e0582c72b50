//! Coordinates, great-circle distance, and bounding boxes.
//!
//! Claims are small (at most a few hundred meters across), so distances use
//! the haversine formula on a spherical Earth and areas use a fixed
//! meters-per-degree scale. Neither is suitable for sub-meter work.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Approximate length of one degree of arc, used to scale planar
/// degree-space results into meters.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// A WGS-84 latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// `true` when both components are finite and inside WGS-84 range.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Great-circle distance to `other` in meters.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        haversine_distance(self, other)
    }

    /// Point offset by the given metric displacement (north/east positive).
    ///
    /// Uses the same fixed scale as the area calculation; only meaningful for
    /// short offsets.
    pub fn offset_meters(&self, north: f64, east: f64) -> Coordinate {
        Coordinate {
            lat: self.lat + north / METERS_PER_DEGREE,
            lon: self.lon + east / (METERS_PER_DEGREE * self.lat.to_radians().cos()),
        }
    }
}

impl From<Coordinate> for geo::Coord<f64> {
    fn from(c: Coordinate) -> Self {
        geo::Coord { x: c.lon, y: c.lat }
    }
}

impl From<geo::Coord<f64>> for Coordinate {
    fn from(c: geo::Coord<f64>) -> Self {
        Coordinate { lat: c.y, lon: c.x }
    }
}

/// Haversine great-circle distance between two coordinates, in meters.
pub fn haversine_distance(a: &Coordinate, b: &Coordinate) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().min(1.0).asin()
}

/// Axis-aligned bounding box in degrees. Stored alongside every territory for
/// cheap prefiltering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Smallest box containing every coordinate, or `None` for an empty slice.
    pub fn from_coordinates(coords: &[Coordinate]) -> Option<Self> {
        let first = coords.first()?;
        let init = BoundingBox {
            min_lat: first.lat,
            min_lon: first.lon,
            max_lat: first.lat,
            max_lon: first.lon,
        };
        Some(coords.iter().skip(1).fold(init, |b, c| BoundingBox {
            min_lat: b.min_lat.min(c.lat),
            min_lon: b.min_lon.min(c.lon),
            max_lat: b.max_lat.max(c.lat),
            max_lon: b.max_lon.max(c.lon),
        }))
    }

    /// Box covering a circle of `radius_meters` around `center`.
    ///
    /// Boxes never wrap. A circle that crosses the antimeridian or reaches a
    /// pole gets the full longitude range; callers filter by exact distance.
    pub fn around(center: &Coordinate, radius_meters: f64) -> Self {
        let d_lat = (radius_meters / EARTH_RADIUS_METERS).to_degrees();
        let min_lat = (center.lat - d_lat).max(-90.0);
        let max_lat = (center.lat + d_lat).min(90.0);

        let cos_lat = center.lat.to_radians().cos().abs().max(1e-6);
        let d_lon = d_lat / cos_lat;
        let (mut min_lon, mut max_lon) = (center.lon - d_lon, center.lon + d_lon);
        if min_lon < -180.0 || max_lon > 180.0 || min_lat <= -90.0 || max_lat >= 90.0 {
            (min_lon, max_lon) = (-180.0, 180.0);
        }

        BoundingBox {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        }
    }

    /// Inclusive overlap test; boxes that share only an edge intersect.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_lat <= other.max_lat
            && other.min_lat <= self.max_lat
            && self.min_lon <= other.max_lon
            && other.min_lon <= self.max_lon
    }

    pub fn contains(&self, c: &Coordinate) -> bool {
        (self.min_lat..=self.max_lat).contains(&c.lat)
            && (self.min_lon..=self.max_lon).contains(&c.lon)
    }

    /// `true` when min <= max on both axes and every bound is a valid coordinate.
    pub fn is_valid(&self) -> bool {
        Coordinate::new(self.min_lat, self.min_lon).is_valid()
            && Coordinate::new(self.max_lat, self.max_lon).is_valid()
            && self.min_lat <= self.max_lat
            && self.min_lon <= self.max_lon
    }
}
