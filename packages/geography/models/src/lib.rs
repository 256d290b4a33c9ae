#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Administrative region boundary and coordinate types.
//!
//! Regions are first-level administrative areas (states, provinces,
//! counties) read from a static boundary file. They are reference data:
//! loaded once and never mutated afterwards.

use geo::{MultiPolygon, Point};
use serde::{Deserialize, Serialize};

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

impl Coordinates {
    /// Returns the coordinates as a `geo` point (`x` = longitude, `y` = latitude).
    #[must_use]
    pub fn to_point(self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

impl From<Point<f64>> for Coordinates {
    fn from(point: Point<f64>) -> Self {
        Self {
            latitude: point.y(),
            longitude: point.x(),
        }
    }
}

/// A region boundary with its representative point.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionGeometry {
    /// Region name as it appears in the boundary file (e.g. "Nairobi").
    pub name: String,
    /// Boundary polygon(s). Features sharing a name are merged here.
    pub boundary: MultiPolygon<f64>,
    /// Representative point used to query point-based providers. Always
    /// inside or on the boundary.
    pub centroid: Coordinates,
}
