#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Climate and health observation types and provider configuration.
//!
//! The climate provider produces one [`ClimateObservation`] per calendar
//! day for a point; the health provider produces sparse, coarser
//! [`HealthObservation`] records (one per year) for a country scope.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// One day of climate data at a queried point.
///
/// Values the provider reports as unavailable (its fill value) are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClimateObservation {
    /// Calendar day.
    pub date: NaiveDate,
    /// Mean air temperature at 2 m, in °C.
    pub temperature: Option<f64>,
    /// Total precipitation, in mm.
    pub precipitation: Option<f64>,
}

/// One period of disease case counts for a health scope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthObservation {
    /// Period start (January 1 for yearly indicators).
    pub date: NaiveDate,
    /// Count-like indicator value. Never negative.
    pub case_count: f64,
}

/// Error returned when a [`DateWindow`] cannot be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowError {
    /// `end` precedes `start`.
    Reversed {
        /// Requested first day.
        start: NaiveDate,
        /// Requested last day.
        end: NaiveDate,
    },
    /// `end - days` falls before the earliest representable date.
    OutOfRange {
        /// Requested last day.
        end: NaiveDate,
        /// Requested look-back in days.
        days: u32,
    },
}

impl std::fmt::Display for WindowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reversed { start, end } => {
                write!(f, "invalid date window: end {end} precedes start {start}")
            }
            Self::OutOfRange { end, days } => {
                write!(f, "invalid date window: {days} days before {end} is out of range")
            }
        }
    }
}

impl std::error::Error for WindowError {}

/// An inclusive range of calendar days. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawDateWindow")]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawDateWindow> for DateWindow {
    type Error = WindowError;

    fn try_from(raw: RawDateWindow) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl DateWindow {
    /// Creates the window `[start, end]`.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::Reversed`] if `end` precedes `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, WindowError> {
        if end < start {
            return Err(WindowError::Reversed { start, end });
        }
        Ok(Self { start, end })
    }

    /// The window `[end - days, end]`.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::OutOfRange`] if the start date is not
    /// representable.
    pub fn ending_on(end: NaiveDate, days: u32) -> Result<Self, WindowError> {
        let start = end
            .checked_sub_days(Days::new(u64::from(days)))
            .ok_or(WindowError::OutOfRange { end, days })?;
        Ok(Self { start, end })
    }

    /// First day (inclusive).
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day (inclusive).
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of calendar days in the window, both ends included.
    #[must_use]
    pub fn len(&self) -> usize {
        usize::try_from((self.end - self.start).num_days() + 1).unwrap_or(0)
    }

    /// Always `false`: a window holds at least one day.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Iterates the days of the window in ascending order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

/// The indicator and spatial scope requested from the health provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthScope {
    /// Indicator code (e.g. `WHS4_159`).
    pub indicator: String,
    /// ISO 3166-1 alpha-3 country code (e.g. `KEN`).
    pub iso: String,
}

/// Connection settings for the daily point climate provider (NASA POWER).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimateProviderConfig {
    /// Daily point endpoint.
    pub base_url: String,
    /// Parameter code for temperature.
    pub temperature_parameter: String,
    /// Parameter code for precipitation.
    pub precipitation_parameter: String,
    /// User community the request is attributed to.
    pub community: String,
    /// Client identifier sent with every request.
    pub user: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ClimateProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://power.larc.nasa.gov/api/temporal/daily/point".to_string(),
            temperature_parameter: "T2M".to_string(),
            precipitation_parameter: "PRECTOTCORR".to_string(),
            community: "AG".to_string(),
            user: "dashboard_user".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Connection settings for the health indicator provider (WHO GHO).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthProviderConfig {
    /// OData API root; the indicator code is appended as a path segment.
    pub base_url: String,
    /// Indicator code.
    pub indicator: String,
    /// ISO country code used as the spatial filter.
    pub iso: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl HealthProviderConfig {
    /// The configured indicator and scope.
    #[must_use]
    pub fn scope(&self) -> HealthScope {
        HealthScope {
            indicator: self.indicator.clone(),
            iso: self.iso.clone(),
        }
    }
}

impl Default for HealthProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://ghoapi.azureedge.net/api".to_string(),
            indicator: "WHS4_159".to_string(),
            iso: "KEN".to_string(),
            timeout_secs: 60,
        }
    }
}
