//! Builds the [`Report`] handed to the presentation layer.

use climate_health_dashboard_models::{RegionRisk, Report, SeriesSummary};
use climate_health_fusion_models::{ForecastPoint, UnifiedRecord};
use climate_health_geography_models::{Coordinates, RegionGeometry};
use climate_health_source_models::DateWindow;

/// The most recent record, if any.
#[must_use]
pub fn latest(records: &[UnifiedRecord]) -> Option<&UnifiedRecord> {
    records.iter().max_by_key(|r| r.date)
}

/// Window means of the three raw signals plus the latest risk index.
#[must_use]
pub fn summarize(records: &[UnifiedRecord]) -> SeriesSummary {
    SeriesSummary {
        mean_temperature: mean(records.iter().filter_map(|r| r.temperature)),
        mean_precipitation: mean(records.iter().filter_map(|r| r.precipitation)),
        mean_case_count: mean(records.iter().filter_map(|r| r.case_count)),
        latest_risk_index: latest(records).map(|r| r.risk_index),
    }
}

/// One [`RegionRisk`] per region in `regions`, in the same order.
///
/// Only `selected` carries a value (from `latest`); every other region is
/// listed without one.
#[must_use]
pub fn region_risks(
    regions: &[RegionGeometry],
    selected: &str,
    latest: Option<&UnifiedRecord>,
) -> Vec<RegionRisk> {
    regions
        .iter()
        .map(|region| {
            let value = latest.filter(|_| region.name == selected);
            RegionRisk {
                region_name: region.name.clone(),
                date: value.map(|r| r.date),
                risk_index: value.map(|r| r.risk_index),
            }
        })
        .collect()
}

/// Assembles the report for `region`, resolved to `centroid`, from the
/// scored records and forecast.
#[must_use]
pub fn assemble(
    region: &str,
    centroid: Coordinates,
    regions: &[RegionGeometry],
    window: DateWindow,
    records: Vec<UnifiedRecord>,
    forecast: Vec<ForecastPoint>,
) -> Report {
    let summary = summarize(&records);
    let map = region_risks(regions, region, latest(&records));

    Report {
        region: region.to_string(),
        centroid,
        window,
        summary,
        records,
        forecast,
        map,
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0u32), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / f64::from(count))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use geo::{MultiPolygon, polygon};

    use super::*;

    fn record(day: u32, case_count: Option<f64>, risk_index: f64) -> UnifiedRecord {
        UnifiedRecord {
            date: NaiveDate::from_ymd_opt(2025, 4, day).unwrap(),
            temperature: Some(20.0 + f64::from(day)),
            precipitation: Some(2.0),
            case_count,
            temp_norm: 0.0,
            precip_norm: 0.0,
            case_norm: 0.0,
            risk_index,
        }
    }

    fn region(name: &str) -> RegionGeometry {
        RegionGeometry {
            name: name.to_string(),
            boundary: MultiPolygon(vec![polygon![
                (x: 0.0, y: 0.0),
                (x: 1.0, y: 0.0),
                (x: 1.0, y: 1.0),
                (x: 0.0, y: 0.0),
            ]]),
            centroid: Coordinates {
                latitude: 0.5,
                longitude: 0.5,
            },
        }
    }

    #[test]
    fn summary_means_skip_missing_values() {
        let records = vec![record(1, Some(4.0), 0.1), record(2, None, 0.2), record(3, Some(8.0), 0.9)];
        let summary = summarize(&records);
        assert_eq!(summary.mean_temperature, Some(22.0));
        assert_eq!(summary.mean_precipitation, Some(2.0));
        assert_eq!(summary.mean_case_count, Some(6.0));
        assert_eq!(summary.latest_risk_index, Some(0.9));
    }

    #[test]
    fn summary_of_empty_column_is_none() {
        let summary = summarize(&[record(1, None, 0.0)]);
        assert_eq!(summary.mean_case_count, None);
        assert_eq!(summarize(&[]), SeriesSummary::default());
    }

    #[test]
    fn only_selected_region_carries_risk() {
        let regions = vec![region("Nairobi"), region("Mombasa"), region("Kisumu")];
        let records = vec![record(1, None, 0.2), record(2, None, 0.7)];
        let risks = region_risks(&regions, "Mombasa", latest(&records));

        let names: Vec<&str> = risks.iter().map(|r| r.region_name.as_str()).collect();
        assert_eq!(names, vec!["Nairobi", "Mombasa", "Kisumu"]);
        assert_eq!(risks[1].risk_index, Some(0.7));
        assert_eq!(risks[1].date, NaiveDate::from_ymd_opt(2025, 4, 2));
        assert!(risks[0].risk_index.is_none());
        assert!(risks[2].risk_index.is_none());
    }

    #[test]
    fn assemble_exposes_full_series() {
        let regions = vec![region("Nairobi")];
        let window = DateWindow::new(
            NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 4, 2).unwrap(),
        )
        .unwrap();
        let records = vec![record(1, Some(1.0), 0.0), record(2, Some(1.0), 0.5)];
        let point = Coordinates {
            latitude: -1.29,
            longitude: 36.82,
        };
        let report = assemble("Nairobi", point, &regions, window, records.clone(), Vec::new());

        assert_eq!(report.region, "Nairobi");
        assert_eq!(report.centroid, point);
        assert_eq!(report.window, window);
        assert_eq!(report.records, records);
        assert_eq!(report.map.len(), 1);
        assert_eq!(report.map[0].risk_index, Some(0.5));
    }
}
