//! WHO Global Health Observatory (GHO) OData client.
//!
//! Fetches an indicator for a single country with an OData `$filter` on
//! `SpatialDim`. Each record in the response's `value` array carries the
//! year in `TimeDim` and the indicator in `NumericValue`; records lacking
//! either are skipped.
//!
//! See <https://www.who.int/data/gho/info/gho-odata-api>

use async_trait::async_trait;
use chrono::NaiveDate;
use climate_health_source_models::{HealthObservation, HealthProviderConfig, HealthScope};

use crate::{HealthSource, SourceError, http};

/// Client for the GHO OData API.
pub struct GhoHealth {
    client: reqwest::Client,
    config: HealthProviderConfig,
}

impl GhoHealth {
    /// Creates a client from provider settings.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::HealthFetch`] if the HTTP client cannot be
    /// built.
    pub fn new(config: HealthProviderConfig) -> Result<Self, SourceError> {
        let client =
            crate::build_http_client(config.timeout_secs).map_err(SourceError::HealthFetch)?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl HealthSource for GhoHealth {
    fn id(&self) -> &str {
        "who_gho"
    }

    async fn fetch_health(
        &self,
        scope: &HealthScope,
    ) -> Result<Vec<HealthObservation>, SourceError> {
        let url = indicator_url(&self.config.base_url, &scope.indicator);
        let filter = spatial_filter(&scope.iso);
        log::info!(
            "Fetching health indicator {} for {}",
            scope.indicator,
            scope.iso
        );

        let body = http::send_json(self.client.get(&url).query(&[("$filter", filter.as_str())]))
            .await
            .map_err(SourceError::HealthFetch)?;

        let observations = parse_response(&body);
        if observations.is_empty() {
            log::warn!(
                "Health indicator {} has no dated records for {}",
                scope.indicator,
                scope.iso
            );
        } else {
            log::info!("Parsed {} health observations", observations.len());
        }
        Ok(observations)
    }
}

/// `{base_url}/{indicator}` without a doubled slash.
fn indicator_url(base_url: &str, indicator: &str) -> String {
    format!("{}/{indicator}", base_url.trim_end_matches('/'))
}

/// OData filter selecting one country.
fn spatial_filter(iso: &str) -> String {
    format!("SpatialDim eq '{}'", iso.replace('\'', "''"))
}

/// Parses a GHO response into observations sorted by date.
///
/// A body without a `value` array yields no observations.
#[must_use]
pub fn parse_response(body: &serde_json::Value) -> Vec<HealthObservation> {
    let Some(records) = body.get("value").and_then(serde_json::Value::as_array) else {
        return Vec::new();
    };

    let mut observations: Vec<HealthObservation> =
        records.iter().filter_map(parse_record).collect();
    observations.sort_by_key(|o| o.date);
    observations
}

/// Parses a single record, returning `None` when it has no usable year or
/// value.
fn parse_record(record: &serde_json::Value) -> Option<HealthObservation> {
    let year = record.get("TimeDim").and_then(|v| {
        v.as_i64()
            .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
    })?;
    let date = NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, 1, 1)?;

    let value = record.get("NumericValue").and_then(serde_json::Value::as_f64)?;
    if !value.is_finite() || value < 0.0 {
        log::warn!("Skipping health record for {year}: invalid value {value}");
        return None;
    }

    Some(HealthObservation {
        date,
        case_count: value,
    })
}
