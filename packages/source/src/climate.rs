//! NASA POWER daily point climate client.
//!
//! Requests daily temperature and precipitation for a single point and
//! date window. The response nests values as
//! `properties.parameter.{CODE}.{YYYYMMDD} -> number`, and marks days the
//! provider has no data for with `header.fill_value` (usually `-999`).
//!
//! See <https://power.larc.nasa.gov/docs/services/api/temporal/daily/>

use async_trait::async_trait;
use climate_health_geography_models::Coordinates;
use climate_health_source_models::{ClimateObservation, ClimateProviderConfig, DateWindow};

use crate::{ClimateSource, SourceError, http};

/// Fill value assumed when the response header does not declare one.
pub const DEFAULT_FILL_VALUE: f64 = -999.0;

/// Date format used for request parameters and response keys.
const DATE_KEY_FORMAT: &str = "%Y%m%d";

/// Client for the NASA POWER daily point endpoint.
pub struct NasaPower {
    client: reqwest::Client,
    config: ClimateProviderConfig,
}

impl NasaPower {
    /// Creates a client from provider settings.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::ClimateFetch`] if the HTTP client cannot be
    /// built.
    pub fn new(config: ClimateProviderConfig) -> Result<Self, SourceError> {
        let client =
            crate::build_http_client(config.timeout_secs).map_err(SourceError::ClimateFetch)?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl ClimateSource for NasaPower {
    fn id(&self) -> &str {
        "nasa_power"
    }

    async fn fetch_climate(
        &self,
        point: Coordinates,
        window: DateWindow,
    ) -> Result<Vec<ClimateObservation>, SourceError> {
        let params = request_params(&self.config, point, window);
        log::info!(
            "Fetching climate data for ({:.4}, {:.4}) from {} to {}",
            point.latitude,
            point.longitude,
            window.start(),
            window.end()
        );

        let body = http::send_json(self.client.get(&self.config.base_url).query(&params))
            .await
            .map_err(http::HttpError::into_climate_error)?;

        let observations = parse_response(
            &body,
            &self.config.temperature_parameter,
            &self.config.precipitation_parameter,
            window,
        )?;
        log::info!("Parsed {} daily climate observations", observations.len());
        Ok(observations)
    }
}

/// Builds the query string for a daily point request.
fn request_params(
    config: &ClimateProviderConfig,
    point: Coordinates,
    window: DateWindow,
) -> Vec<(&'static str, String)> {
    vec![
        ("start", window.start().format(DATE_KEY_FORMAT).to_string()),
        ("end", window.end().format(DATE_KEY_FORMAT).to_string()),
        ("latitude", point.latitude.to_string()),
        ("longitude", point.longitude.to_string()),
        (
            "parameters",
            format!(
                "{},{}",
                config.temperature_parameter, config.precipitation_parameter
            ),
        ),
        ("community", config.community.clone()),
        ("format", "JSON".to_string()),
        ("user", config.user.clone()),
    ]
}

/// Parses a daily point response into one observation per day of `window`.
///
/// # Errors
///
/// Returns [`SourceError::ClimateParse`] if the parameter mapping, either
/// requested parameter, or any day of the window is missing, or a value is
/// not numeric.
pub fn parse_response(
    body: &serde_json::Value,
    temperature_code: &str,
    precipitation_code: &str,
    window: DateWindow,
) -> Result<Vec<ClimateObservation>, SourceError> {
    let parameters = body
        .pointer("/properties/parameter")
        .and_then(serde_json::Value::as_object)
        .ok_or_else(|| SourceError::ClimateParse {
            message: "missing properties.parameter".to_string(),
        })?;

    let series = |code: &str| {
        parameters
            .get(code)
            .and_then(serde_json::Value::as_object)
            .ok_or_else(|| SourceError::ClimateParse {
                message: format!("missing parameter {code}"),
            })
    };
    let temperature = series(temperature_code)?;
    let precipitation = series(precipitation_code)?;

    let fill_value = body
        .pointer("/header/fill_value")
        .and_then(serde_json::Value::as_f64)
        .unwrap_or(DEFAULT_FILL_VALUE);

    let value_for = |values: &serde_json::Map<String, serde_json::Value>,
                     code: &str,
                     key: &str|
     -> Result<Option<f64>, SourceError> {
        let raw = values.get(key).ok_or_else(|| SourceError::ClimateParse {
            message: format!("{code} has no value for {key}"),
        })?;
        let value = raw.as_f64().ok_or_else(|| SourceError::ClimateParse {
            message: format!("{code} value for {key} is not a number: {raw}"),
        })?;
        Ok(is_present(value, fill_value).then_some(value))
    };

    let mut observations = Vec::with_capacity(window.len());
    let mut missing = 0usize;

    for date in window.days() {
        let key = date.format(DATE_KEY_FORMAT).to_string();
        let observation = ClimateObservation {
            date,
            temperature: value_for(temperature, temperature_code, &key)?,
            precipitation: value_for(precipitation, precipitation_code, &key)?,
        };
        if observation.temperature.is_none() || observation.precipitation.is_none() {
            missing += 1;
        }
        observations.push(observation);
    }

    if missing > 0 {
        log::warn!("{missing} day(s) carry the provider fill value {fill_value}");
    }

    Ok(observations)
}

/// Whether `value` is real data rather than the provider's fill value.
fn is_present(value: f64, fill_value: f64) -> bool {
    value.is_finite() && (value - fill_value).abs() > f64::EPSILON
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn window(start: u32, end: u32) -> DateWindow {
        DateWindow::new(
            NaiveDate::from_ymd_opt(2025, 1, start).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, end).unwrap(),
        )
        .unwrap()
    }

    fn body() -> serde_json::Value {
        serde_json::json!({
            "header": { "fill_value": -999.0 },
            "properties": {
                "parameter": {
                    "T2M": { "20250101": 21.5, "20250102": 22.0, "20250103": -999.0 },
                    "PRECTOTCORR": { "20250101": 0.0, "20250102": 4.2, "20250103": 1.1 }
                }
            }
        })
    }

    #[test]
    fn parses_one_observation_per_day_in_order() {
        let obs = parse_response(&body(), "T2M", "PRECTOTCORR", window(1, 3)).unwrap();
        assert_eq!(obs.len(), 3);
        assert!(obs.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(obs[0].temperature, Some(21.5));
        assert_eq!(obs[1].precipitation, Some(4.2));
    }

    #[test]
    fn fill_value_becomes_missing() {
        let obs = parse_response(&body(), "T2M", "PRECTOTCORR", window(1, 3)).unwrap();
        assert_eq!(obs[2].temperature, None);
        assert_eq!(obs[2].precipitation, Some(1.1));
    }

    #[test]
    fn ignores_days_outside_window() {
        let obs = parse_response(&body(), "T2M", "PRECTOTCORR", window(2, 2)).unwrap();
        assert_eq!(obs.len(), 1);
        assert_eq!(obs[0].temperature, Some(22.0));
    }

    #[test]
    fn missing_parameter_is_a_parse_error() {
        let err = parse_response(&body(), "T2M", "PRECTOT", window(1, 3)).unwrap_err();
        assert!(matches!(err, SourceError::ClimateParse { ref message } if message.contains("PRECTOT")));
    }

    #[test]
    fn missing_day_is_a_parse_error() {
        let err = parse_response(&body(), "T2M", "PRECTOTCORR", window(1, 4)).unwrap_err();
        assert!(matches!(err, SourceError::ClimateParse { ref message } if message.contains("20250104")));
    }

    #[test]
    fn missing_properties_is_a_parse_error() {
        let body = serde_json::json!({ "messages": ["Invalid request"] });
        assert!(matches!(
            parse_response(&body, "T2M", "PRECTOTCORR", window(1, 1)),
            Err(SourceError::ClimateParse { .. })
        ));
    }

    #[test]
    fn non_numeric_value_is_a_parse_error() {
        let body = serde_json::json!({
            "properties": { "parameter": {
                "T2M": { "20250101": "warm" },
                "PRECTOTCORR": { "20250101": 0.0 }
            } }
        });
        assert!(matches!(
            parse_response(&body, "T2M", "PRECTOTCORR", window(1, 1)),
            Err(SourceError::ClimateParse { .. })
        ));
    }

    #[test]
    fn builds_request_params() {
        let config = ClimateProviderConfig::default();
        let point = Coordinates {
            latitude: -1.25,
            longitude: 36.75,
        };
        let params = request_params(&config, point, window(1, 31));
        assert!(params.contains(&("start", "20250101".to_string())));
        assert!(params.contains(&("end", "20250131".to_string())));
        assert!(params.contains(&("latitude", "-1.25".to_string())));
        assert!(params.contains(&("parameters", "T2M,PRECTOTCORR".to_string())));
        assert!(params.contains(&("format", "JSON".to_string())));
    }
}
