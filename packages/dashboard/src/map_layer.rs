//! Choropleth layer: region boundaries with their current risk value.

use std::collections::BTreeMap;
use std::path::Path;

use climate_health_dashboard_models::RegionRisk;
use climate_health_geography_models::RegionGeometry;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue};

/// Builds one feature per region with `name`, `risk_index` and `date`
/// properties. Regions without a risk value get `null` properties.
#[must_use]
pub fn risk_map(regions: &[RegionGeometry], risks: &[RegionRisk]) -> FeatureCollection {
    let by_name: BTreeMap<&str, &RegionRisk> = risks
        .iter()
        .map(|r| (r.region_name.as_str(), r))
        .collect();

    let features = regions
        .iter()
        .map(|region| {
            let risk = by_name.get(region.name.as_str());

            let mut properties = JsonObject::new();
            properties.insert("name".to_string(), JsonValue::from(region.name.clone()));
            properties.insert(
                "risk_index".to_string(),
                risk.and_then(|r| r.risk_index)
                    .map_or(JsonValue::Null, JsonValue::from),
            );
            properties.insert(
                "date".to_string(),
                risk.and_then(|r| r.date)
                    .map_or(JsonValue::Null, |d| JsonValue::from(d.to_string())),
            );

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(geojson::Value::from(&region.boundary))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Writes the layer as a `GeoJSON` file.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be written.
pub fn write_risk_map(path: &Path, layer: &FeatureCollection) -> std::io::Result<()> {
    std::fs::write(path, serde_json::to_vec(layer).map_err(std::io::Error::from)?)?;
    log::info!(
        "Wrote risk map with {} regions to {}",
        layer.features.len(),
        path.display()
    );
    Ok(())
}
