#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Unified climate-health record and forecast point types.
//!
//! Field names are `snake_case` on the wire because they double as the
//! column headers of the delimited-text export.

use chrono::NaiveDate;
use climate_health_source_models::ClimateObservation;
use serde::{Deserialize, Serialize};

/// One day of merged climate and health data plus derived scores.
///
/// The normalized fields and `risk_index` are `0.0` until the record has
/// been scored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnifiedRecord {
    /// Calendar day (from the climate series).
    pub date: NaiveDate,
    /// Temperature in °C.
    pub temperature: Option<f64>,
    /// Precipitation in mm.
    pub precipitation: Option<f64>,
    /// Disease case count. `None` before gap-filling, or when the health
    /// series was empty.
    pub case_count: Option<f64>,
    /// Temperature rescaled to `[0, 1]` over the window.
    pub temp_norm: f64,
    /// Precipitation rescaled to `[0, 1]` over the window.
    pub precip_norm: f64,
    /// Case count rescaled to `[0, 1]` over the window.
    pub case_norm: f64,
    /// Mean of the normalized components, in `[0, 1]`.
    pub risk_index: f64,
}

impl From<ClimateObservation> for UnifiedRecord {
    fn from(obs: ClimateObservation) -> Self {
        Self {
            date: obs.date,
            temperature: obs.temperature,
            precipitation: obs.precipitation,
            case_count: None,
            temp_norm: 0.0,
            precip_norm: 0.0,
            case_norm: 0.0,
            risk_index: 0.0,
        }
    }
}

/// A forecast value with its uncertainty band.
///
/// Invariant: `lower_bound <= estimate <= upper_bound`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Day the estimate applies to.
    pub date: NaiveDate,
    /// Central estimate.
    pub estimate: f64,
    /// Lower edge of the uncertainty band.
    pub lower_bound: f64,
    /// Upper edge of the uncertainty band.
    pub upper_bound: f64,
}
