#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Climate and health provider clients.
//!
//! Each provider implements [`ClimateSource`] or [`HealthSource`] so the
//! pipeline can be driven by the live HTTP clients ([`climate::NasaPower`],
//! [`health::GhoHealth`]) or by in-memory series in tests. Every fetch is a
//! single request: failures are reported, never retried.

pub mod climate;
pub mod health;
pub mod http;

use std::time::Duration;

use async_trait::async_trait;
use climate_health_geography_models::Coordinates;
use climate_health_source_models::{ClimateObservation, DateWindow, HealthObservation, HealthScope};

use crate::http::HttpError;

/// Errors that can occur while fetching provider data.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The climate provider was unreachable or returned a non-success status.
    #[error("Climate fetch failed: {0}")]
    ClimateFetch(#[source] HttpError),

    /// The climate response was missing expected fields or values.
    #[error("Climate response could not be parsed: {message}")]
    ClimateParse {
        /// Description of what was missing or malformed.
        message: String,
    },

    /// The health provider was unreachable, returned a non-success status,
    /// or returned an unreadable body.
    #[error("Health fetch failed: {0}")]
    HealthFetch(#[source] HttpError),
}

/// A provider of daily climate observations for a point.
#[async_trait]
pub trait ClimateSource: Send + Sync {
    /// Returns a short identifier for log messages (e.g. `"nasa_power"`).
    fn id(&self) -> &str;

    /// Fetches one observation per day of `window` at `point`, ordered by
    /// date ascending.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::ClimateFetch`] on transport or status
    /// failures and [`SourceError::ClimateParse`] on malformed responses.
    async fn fetch_climate(
        &self,
        point: Coordinates,
        window: DateWindow,
    ) -> Result<Vec<ClimateObservation>, SourceError>;
}

/// A provider of periodic disease case counts.
#[async_trait]
pub trait HealthSource: Send + Sync {
    /// Returns a short identifier for log messages (e.g. `"who_gho"`).
    fn id(&self) -> &str;

    /// Fetches all dated observations for `scope`, ordered by date
    /// ascending. An empty result is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::HealthFetch`] if the provider cannot be
    /// reached or answers with a non-success status.
    async fn fetch_health(&self, scope: &HealthScope)
    -> Result<Vec<HealthObservation>, SourceError>;
}

/// Builds the shared HTTP client used by the provider clients.
///
/// # Errors
///
/// Returns [`HttpError`] if the TLS backend cannot be initialized.
pub fn build_http_client(timeout_secs: u64) -> Result<reqwest::Client, HttpError> {
    Ok(reqwest::Client::builder()
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .timeout(Duration::from_secs(timeout_secs))
        .build()?)
}
