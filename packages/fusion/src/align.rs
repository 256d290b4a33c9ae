//! Left join of the health series onto the daily climate axis, followed by
//! forward-then-backward gap-filling.
//!
//! Health observations are yearly, so almost every climate day has no
//! matching health date. Forward-fill is seeded with the latest
//! observation before the window and backward-fill with the earliest one
//! after it, so a non-empty health series always leaves every day filled.

use std::collections::BTreeMap;
use std::ops::Bound;

use chrono::NaiveDate;
use climate_health_fusion_models::UnifiedRecord;
use climate_health_source_models::{ClimateObservation, HealthObservation};

/// Merges the two series into one record per climate day.
///
/// The output has exactly one record per climate observation, in the
/// climate series' order. `case_count` is null only when `health` is
/// empty. Temperature and precipitation gaps (provider fill values) are
/// filled the same way, without seeds.
#[must_use]
pub fn align(climate: Vec<ClimateObservation>, health: &[HealthObservation]) -> Vec<UnifiedRecord> {
    let by_date = collapse_by_date(health);

    let mut records: Vec<UnifiedRecord> = climate
        .into_iter()
        .map(|obs| {
            let mut record = UnifiedRecord::from(obs);
            record.case_count = by_date.get(&obs.date).copied();
            record
        })
        .collect();

    let matched = records.iter().filter(|r| r.case_count.is_some()).count();
    log::debug!(
        "Joined {} health observations onto {} climate days ({matched} matched)",
        by_date.len(),
        records.len()
    );

    let (Some(first), Some(last)) = (
        records.first().map(|r| r.date),
        records.last().map(|r| r.date),
    ) else {
        return records;
    };
    let before = by_date.range(..first).next_back().map(|(_, v)| *v);
    let after = by_date
        .range((Bound::Excluded(last), Bound::Unbounded))
        .next()
        .map(|(_, v)| *v);

    gap_fill(&mut records, before, after);
    records
}

/// Fills nulls in place: forward-fill first, then backward-fill.
///
/// `case_seed_before` / `case_seed_after` are the nearest case counts
/// outside the record range, used as the starting values of the forward
/// and backward passes for `case_count`.
pub fn gap_fill(
    records: &mut [UnifiedRecord],
    case_seed_before: Option<f64>,
    case_seed_after: Option<f64>,
) {
    fill_column(
        records,
        |r| r.case_count,
        |r, v| r.case_count = v,
        case_seed_before,
        case_seed_after,
    );
    fill_column(
        records,
        |r| r.temperature,
        |r, v| r.temperature = v,
        None,
        None,
    );
    fill_column(
        records,
        |r| r.precipitation,
        |r, v| r.precipitation = v,
        None,
        None,
    );
}

fn fill_column(
    records: &mut [UnifiedRecord],
    get: impl Fn(&UnifiedRecord) -> Option<f64>,
    set: impl Fn(&mut UnifiedRecord, Option<f64>),
    seed_before: Option<f64>,
    seed_after: Option<f64>,
) {
    let mut column: Vec<Option<f64>> = records.iter().map(get).collect();
    forward_fill(&mut column, seed_before);
    backward_fill(&mut column, seed_after);
    for (record, value) in records.iter_mut().zip(column) {
        set(record, value);
    }
}

/// Replaces each null with the most recent preceding non-null value
/// (or `seed` when nothing precedes it).
pub fn forward_fill(values: &mut [Option<f64>], seed: Option<f64>) {
    let mut last = seed;
    for value in values.iter_mut() {
        if let Some(v) = *value {
            last = Some(v);
        } else {
            *value = last;
        }
    }
}

/// Replaces each null with the nearest following non-null value (or
/// `seed` when nothing follows it).
pub fn backward_fill(values: &mut [Option<f64>], seed: Option<f64>) {
    let mut next = seed;
    for value in values.iter_mut().rev() {
        if let Some(v) = *value {
            next = Some(v);
        } else {
            *value = next;
        }
    }
}

/// Indexes health observations by date. Observations sharing a date are
/// averaged so the join never duplicates a climate day.
fn collapse_by_date(health: &[HealthObservation]) -> BTreeMap<NaiveDate, f64> {
    let mut sums: BTreeMap<NaiveDate, (f64, u32)> = BTreeMap::new();
    for obs in health {
        let entry = sums.entry(obs.date).or_insert((0.0, 0));
        entry.0 += obs.case_count;
        entry.1 += 1;
    }

    sums.into_iter()
        .map(|(date, (sum, count))| {
            if count > 1 {
                log::warn!("{count} health observations share {date}, using their mean");
            }
            (date, sum / f64::from(count))
        })
        .collect()
}
