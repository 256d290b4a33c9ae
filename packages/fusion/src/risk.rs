//! Min-max normalization and the composite risk index.
//!
//! Each signal is rescaled over the fetched window only, so the index is
//! relative to recent conditions rather than an absolute scale. A constant
//! column normalizes to `0`. An empty column also reports `0` but is left
//! out of the average, so with no health data the index is the mean of the
//! two climate components.

use climate_health_fusion_models::UnifiedRecord;

/// Rescales `values` so the minimum maps to `0` and the maximum to `1`.
///
/// Null cells stay null. If the non-null values are constant, every
/// non-null cell maps to `0`.
#[must_use]
pub fn min_max_normalize(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let (min, max) = values
        .iter()
        .flatten()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    let range = max - min;
    let degenerate = !range.is_finite() || range <= 0.0;

    values
        .iter()
        .map(|value| {
            value.map(|v| {
                if degenerate || !v.is_finite() {
                    0.0
                } else {
                    ((v - min) / range).clamp(0.0, 1.0)
                }
            })
        })
        .collect()
}

/// Normalizes the three signals and computes each record's risk index.
///
/// The normalized fields of a null cell are `0`; `risk_index` is the mean
/// of the normalized components whose cell is present, or `0` if none is.
#[must_use]
pub fn score(records: Vec<UnifiedRecord>) -> Vec<UnifiedRecord> {
    let column = |get: fn(&UnifiedRecord) -> Option<f64>| {
        min_max_normalize(&records.iter().map(get).collect::<Vec<_>>())
    };
    let temp = column(|r| r.temperature);
    let precip = column(|r| r.precipitation);
    let cases = column(|r| r.case_count);

    if cases.iter().all(Option::is_none) {
        log::warn!("No case counts in window; risk index uses climate components only");
    }

    records
        .into_iter()
        .zip(temp)
        .zip(precip)
        .zip(cases)
        .map(|(((mut record, t), p), c)| {
            record.temp_norm = t.unwrap_or(0.0);
            record.precip_norm = p.unwrap_or(0.0);
            record.case_norm = c.unwrap_or(0.0);
            record.risk_index = mean_present(&[t, p, c]);
            record
        })
        .collect()
}

fn mean_present(components: &[Option<f64>]) -> f64 {
    let (sum, count) = components
        .iter()
        .flatten()
        .fold((0.0, 0u32), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / f64::from(count)
    }
}
