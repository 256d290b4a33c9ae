#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Types handed to the presentation layer after a pipeline run.

use chrono::NaiveDate;
use climate_health_fusion_models::{ForecastPoint, UnifiedRecord};
use climate_health_geography_models::Coordinates;
use climate_health_source_models::DateWindow;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Steps of a pipeline run, in execution order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    /// Resolve the region to a point.
    Resolve,
    /// Fetch climate observations.
    Climate,
    /// Fetch health observations.
    Health,
    /// Join and gap-fill the two series.
    Align,
    /// Normalize and compute the risk index.
    Score,
    /// Fit and project the case series.
    Forecast,
    /// Build the report.
    Assemble,
    /// Write output files.
    Export,
}

impl Stage {
    /// Human-readable progress label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Resolve => "Resolving region",
            Self::Climate => "Fetching climate data",
            Self::Health => "Fetching health data",
            Self::Align => "Aligning series",
            Self::Score => "Scoring risk",
            Self::Forecast => "Forecasting cases",
            Self::Assemble => "Assembling report",
            Self::Export => "Writing outputs",
        }
    }
}

/// Tunables for a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Days before `today` included in the window.
    pub window_days: u32,
    /// Days projected past the last record.
    pub horizon_days: usize,
    /// Coverage of the forecast band.
    pub interval_width: f64,
    /// Level smoothing factor.
    pub alpha: f64,
    /// Trend smoothing factor.
    pub beta: f64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            window_days: 60,
            horizon_days: 14,
            interval_width: 0.8,
            alpha: 0.5,
            beta: 0.3,
        }
    }
}

/// Latest risk value for one region, for the choropleth layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionRisk {
    /// Region name.
    pub region_name: String,
    /// Day the risk value applies to.
    pub date: Option<NaiveDate>,
    /// Latest risk index; `None` for regions that were not processed.
    pub risk_index: Option<f64>,
}

/// Window averages shown next to the charts.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesSummary {
    /// Mean temperature over the window.
    pub mean_temperature: Option<f64>,
    /// Mean precipitation over the window.
    pub mean_precipitation: Option<f64>,
    /// Mean case count over the window.
    pub mean_case_count: Option<f64>,
    /// Risk index of the most recent day.
    pub latest_risk_index: Option<f64>,
}

/// Everything the dashboard renders for one region and run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Selected region.
    pub region: String,
    /// Point the climate provider was queried at.
    pub centroid: Coordinates,
    /// Fetched date window.
    pub window: DateWindow,
    /// Window averages.
    pub summary: SeriesSummary,
    /// Scored daily records, ascending by date.
    pub records: Vec<UnifiedRecord>,
    /// Fitted history followed by the projected horizon.
    pub forecast: Vec<ForecastPoint>,
    /// Choropleth values for every known region.
    pub map: Vec<RegionRisk>,
}
