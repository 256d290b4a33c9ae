//! Parsing of region boundaries from a `GeoJSON` `FeatureCollection`.
//!
//! Each feature carries the region name under a configurable property
//! (e.g. `NAME_1` in GADM-style admin-1 exports) and a `Polygon` or
//! `MultiPolygon` geometry. Features that share a name are merged into a
//! single [`MultiPolygon`].

use std::collections::BTreeMap;
use std::path::Path;

use climate_health_geography_models::{Coordinates, RegionGeometry};
use geo::{Centroid, InteriorPoint, Intersects, MultiPolygon, Point, Polygon};
use geojson::GeoJson;

use crate::GeoError;

/// The known region set, in the order regions first appear in the file.
#[derive(Debug, Clone, Default)]
pub struct Boundaries {
    regions: Vec<RegionGeometry>,
    /// region name -> index into `regions`
    index: BTreeMap<String, usize>,
}

impl Boundaries {
    /// Reads and parses a boundary file.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError`] if the file cannot be read or is not a valid
    /// boundary `FeatureCollection`.
    pub fn load(path: &Path, name_property: &str) -> Result<Self, GeoError> {
        let contents = std::fs::read_to_string(path).map_err(|source| GeoError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let boundaries = Self::from_geojson_str(&contents, name_property)?;
        log::info!(
            "Loaded {} regions from {}",
            boundaries.len(),
            path.display()
        );
        Ok(boundaries)
    }

    /// Parses boundaries from a `GeoJSON` string.
    ///
    /// Features without a name or without polygonal geometry are skipped
    /// with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError`] if the input is not `GeoJSON`, is not a
    /// `FeatureCollection`, or contains no usable regions.
    pub fn from_geojson_str(geojson_str: &str, name_property: &str) -> Result<Self, GeoError> {
        let GeoJson::FeatureCollection(collection) = geojson_str.parse::<GeoJson>()? else {
            return Err(GeoError::Conversion {
                message: "Boundary data is not a FeatureCollection".to_string(),
            });
        };

        let mut order: Vec<String> = Vec::new();
        let mut polygons: BTreeMap<String, Vec<Polygon<f64>>> = BTreeMap::new();

        for (i, feature) in collection.features.into_iter().enumerate() {
            let Some(name) = feature
                .property(name_property)
                .and_then(serde_json::Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
            else {
                log::warn!("Skipping boundary feature {i}: no '{name_property}' property");
                continue;
            };

            let Some(geometry) = feature.geometry else {
                log::warn!("Skipping boundary feature {i} ({name}): no geometry");
                continue;
            };

            let parts = match geo::Geometry::<f64>::try_from(geometry) {
                Ok(geo::Geometry::Polygon(p)) => vec![p],
                Ok(geo::Geometry::MultiPolygon(mp)) => mp.0,
                Ok(_) => {
                    log::warn!("Skipping boundary feature {i} ({name}): not a polygon");
                    continue;
                }
                Err(e) => {
                    log::warn!("Skipping boundary feature {i} ({name}): {e}");
                    continue;
                }
            };

            if !polygons.contains_key(&name) {
                order.push(name.clone());
            }
            polygons.entry(name).or_default().extend(parts);
        }

        let mut regions = Vec::with_capacity(order.len());
        let mut index = BTreeMap::new();

        for name in order {
            let boundary = MultiPolygon(polygons.remove(&name).unwrap_or_default());
            let Some(point) = representative_point(&boundary) else {
                log::warn!("Skipping region {name}: boundary has no area");
                continue;
            };
            index.insert(name.clone(), regions.len());
            regions.push(RegionGeometry {
                name,
                boundary,
                centroid: Coordinates::from(point),
            });
        }

        if regions.is_empty() {
            return Err(GeoError::Conversion {
                message: format!("No regions with a '{name_property}' property and polygon geometry"),
            });
        }

        Ok(Self { regions, index })
    }

    /// Number of known regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether no regions are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// All regions, in file order.
    #[must_use]
    pub fn regions(&self) -> &[RegionGeometry] {
        &self.regions
    }

    /// Region names in file order, without duplicates.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.regions.iter().map(|r| r.name.as_str()).collect()
    }

    /// Looks up a region by its exact name.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::UnknownRegion`] if the name is not in the known
    /// region set.
    pub fn get(&self, name: &str) -> Result<&RegionGeometry, GeoError> {
        self.index
            .get(name)
            .map(|&i| &self.regions[i])
            .ok_or_else(|| GeoError::UnknownRegion {
                name: name.to_string(),
            })
    }

    /// Resolves a region name to the point used for climate queries.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::UnknownRegion`] if the name is not in the known
    /// region set.
    pub fn resolve(&self, name: &str) -> Result<Coordinates, GeoError> {
        self.get(name).map(|region| region.centroid)
    }
}

/// Area centroid of the boundary, or an interior point when the centroid
/// of a non-convex shape falls outside it.
fn representative_point(boundary: &MultiPolygon<f64>) -> Option<Point<f64>> {
    let centroid = boundary.centroid()?;
    if boundary.intersects(&centroid) {
        return Some(centroid);
    }
    log::warn!(
        "Centroid ({}, {}) lies outside its boundary, using an interior point",
        centroid.y(),
        centroid.x()
    );
    boundary.interior_point()
}
