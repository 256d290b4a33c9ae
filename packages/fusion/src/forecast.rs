//! Case-count forecasting behind a fit/predict seam.
//!
//! [`Forecaster`] is the capability the pipeline depends on: fit on an
//! ordered `(date, value)` history, then produce a [`ForecastPoint`] for
//! every history day plus `horizon` future days. [`HoltForecaster`] is the
//! shipped model (Holt's linear exponential smoothing with residual-based
//! prediction intervals); any other model implementing the trait can be
//! swapped in.

use chrono::{Days, NaiveDate};
use climate_health_fusion_models::{ForecastPoint, UnifiedRecord};
use thiserror::Error;

/// Days projected past the last observed date.
pub const FORECAST_HORIZON_DAYS: usize = 14;

/// Fewest history points a model can be fitted on.
pub const MIN_HISTORY: usize = 2;

/// Errors raised while fitting or predicting.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForecastError {
    /// Too few history points to fit the model.
    #[error("Insufficient history: need at least {required} points, got {actual}")]
    InsufficientHistory {
        /// Minimum number of points.
        required: usize,
        /// Points supplied.
        actual: usize,
    },

    /// The history is not strictly ascending or contains non-finite values.
    #[error("Invalid history: {0}")]
    InvalidHistory(String),

    /// A model parameter is out of range.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// `predict` was called before a successful `fit`.
    #[error("Model must be fitted before prediction")]
    NotFitted,
}

/// A model that can be fitted on a dated history and projected forward.
pub trait Forecaster {
    /// Fits the model on `history`, which must be ordered by date.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::InsufficientHistory`] if the history is
    /// too short for the model, or [`ForecastError::InvalidHistory`] if it
    /// is unordered or contains non-finite values.
    fn fit(&mut self, history: &[(NaiveDate, f64)]) -> Result<(), ForecastError>;

    /// Produces one point per history day followed by `horizon` consecutive
    /// future days.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::NotFitted`] if called before
    /// [`Forecaster::fit`].
    fn predict(&self, horizon: usize) -> Result<Vec<ForecastPoint>, ForecastError>;
}

/// Extracts the `(date, case_count)` history from aligned records,
/// skipping days without a case count.
#[must_use]
pub fn case_history(records: &[UnifiedRecord]) -> Vec<(NaiveDate, f64)> {
    records
        .iter()
        .filter_map(|r| r.case_count.map(|c| (r.date, c)))
        .collect()
}

/// Fits `model` on the case history of `records` and predicts `horizon`
/// days past the last record.
///
/// # Errors
///
/// Propagates the model's fit/predict errors; in particular
/// [`ForecastError::InsufficientHistory`] when fewer than
/// [`MIN_HISTORY`] records carry a case count.
pub fn forecast<F: Forecaster + ?Sized>(
    model: &mut F,
    records: &[UnifiedRecord],
    horizon: usize,
) -> Result<Vec<ForecastPoint>, ForecastError> {
    let history = case_history(records);
    log::info!(
        "Fitting forecast on {} days, projecting {horizon} days",
        history.len()
    );
    model.fit(&history)?;
    model.predict(horizon)
}

/// Holt's linear exponential smoothing with a symmetric prediction band.
///
/// History estimates are one-step-ahead fitted values. The band half-width
/// is `z * sigma` over the history and `z * sigma * sqrt(h)` at horizon
/// step `h`, where `sigma` is the residual standard deviation and `z` the
/// normal quantile of the interval width.
#[derive(Debug, Clone)]
pub struct HoltForecaster {
    alpha: f64,
    beta: f64,
    interval_width: f64,
    state: Option<FittedState>,
}

#[derive(Debug, Clone)]
struct FittedState {
    dates: Vec<NaiveDate>,
    fitted: Vec<f64>,
    level: f64,
    trend: f64,
    residual_sd: f64,
}

impl HoltForecaster {
    /// Creates a model.
    ///
    /// # Arguments
    ///
    /// * `alpha` - Level smoothing (0 < alpha < 1)
    /// * `beta` - Trend smoothing (0 < beta < 1)
    /// * `interval_width` - Coverage of the band (0 < width < 1, e.g. 0.8)
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::InvalidParameter`] if any argument is out of
    /// range.
    pub fn new(alpha: f64, beta: f64, interval_width: f64) -> Result<Self, ForecastError> {
        for (name, value) in [
            ("alpha", alpha),
            ("beta", beta),
            ("interval_width", interval_width),
        ] {
            if !(0.0 < value && value < 1.0) {
                return Err(ForecastError::InvalidParameter {
                    name: name.to_string(),
                    reason: format!("must be between 0 and 1 (exclusive), got {value}"),
                });
            }
        }

        Ok(Self {
            alpha,
            beta,
            interval_width,
            state: None,
        })
    }
}

impl Forecaster for HoltForecaster {
    fn fit(&mut self, history: &[(NaiveDate, f64)]) -> Result<(), ForecastError> {
        self.state = None;

        if history.len() < MIN_HISTORY {
            return Err(ForecastError::InsufficientHistory {
                required: MIN_HISTORY,
                actual: history.len(),
            });
        }
        if history.iter().any(|(_, v)| !v.is_finite()) {
            return Err(ForecastError::InvalidHistory(
                "history contains non-finite values".to_string(),
            ));
        }
        if let Some(w) = history.windows(2).find(|w| w[0].0 >= w[1].0) {
            return Err(ForecastError::InvalidHistory(format!(
                "dates not strictly ascending at {}",
                w[1].0
            )));
        }

        let values: Vec<f64> = history.iter().map(|(_, v)| *v).collect();

        let mut level = values[0];
        let mut trend = values[1] - values[0];
        let mut fitted = Vec::with_capacity(values.len());
        fitted.push(values[0]);

        for &value in &values[1..] {
            fitted.push(level + trend);
            let prev_level = level;
            level = self.alpha * value + (1.0 - self.alpha) * (level + trend);
            trend = self.beta * (level - prev_level) + (1.0 - self.beta) * trend;
        }

        let residuals: Vec<f64> = values[1..]
            .iter()
            .zip(&fitted[1..])
            .map(|(actual, estimate)| actual - estimate)
            .collect();

        self.state = Some(FittedState {
            dates: history.iter().map(|(d, _)| *d).collect(),
            fitted,
            level,
            trend,
            residual_sd: std_dev(&residuals),
        });
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Vec<ForecastPoint>, ForecastError> {
        let state = self.state.as_ref().ok_or(ForecastError::NotFitted)?;
        let z = z_score(self.interval_width);
        let history_half_width = z * state.residual_sd;

        let mut points = Vec::with_capacity(state.dates.len() + horizon);
        for (&date, &estimate) in state.dates.iter().zip(&state.fitted) {
            points.push(band(date, estimate, history_half_width));
        }

        let last = *state.dates.last().ok_or(ForecastError::NotFitted)?;
        for h in 1..=horizon {
            let date = last
                .checked_add_days(Days::new(h as u64))
                .ok_or_else(|| {
                    ForecastError::InvalidHistory(format!("{last} + {h} days is out of range"))
                })?;
            #[allow(clippy::cast_precision_loss)]
            let steps = h as f64;
            let estimate = steps.mul_add(state.trend, state.level);
            points.push(band(date, estimate, history_half_width * steps.sqrt()));
        }

        Ok(points)
    }
}

fn band(date: NaiveDate, estimate: f64, half_width: f64) -> ForecastPoint {
    let half_width = half_width.abs();
    ForecastPoint {
        date,
        estimate,
        lower_bound: estimate - half_width,
        upper_bound: estimate + half_width,
    }
}

/// Population standard deviation; `0` for fewer than one value.
fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

/// Two-sided normal quantile for a central interval of the given width.
fn z_score(interval_width: f64) -> f64 {
    match interval_width {
        x if x >= 0.99 => 2.576,
        x if x >= 0.95 => 1.96,
        x if x >= 0.90 => 1.645,
        x if x >= 0.80 => 1.282,
        x if x >= 0.50 => 0.674,
        _ => 0.253,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(offset: u64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 1)
            .unwrap()
            .checked_add_days(Days::new(offset))
            .unwrap()
    }

    fn history(values: &[f64]) -> Vec<(NaiveDate, f64)> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| (day(i as u64), v))
            .collect()
    }

    fn model() -> HoltForecaster {
        HoltForecaster::new(0.5, 0.3, 0.8).unwrap()
    }

    #[test]
    fn output_covers_history_plus_horizon() {
        let mut m = model();
        let h = history(&[3.0, 5.0, 4.0, 6.0, 8.0, 7.0, 9.0]);
        m.fit(&h).unwrap();
        let points = m.predict(FORECAST_HORIZON_DAYS).unwrap();
        assert_eq!(points.len(), h.len() + FORECAST_HORIZON_DAYS);
        assert_eq!(points[0].date, day(0));
        assert_eq!(points.last().unwrap().date, day(6 + 14));
        assert!(points.windows(2).all(|w| w[1].date == w[0].date.succ_opt().unwrap()));
    }

    #[test]
    fn bounds_are_ordered() {
        let mut m = model();
        m.fit(&history(&[10.0, 12.0, 9.0, 15.0, 11.0, 20.0, 3.0, 8.0]))
            .unwrap();
        for p in m.predict(14).unwrap() {
            assert!(p.lower_bound <= p.estimate, "{p:?}");
            assert!(p.estimate <= p.upper_bound, "{p:?}");
        }
    }

    #[test]
    fn band_widens_over_horizon() {
        let mut m = model();
        m.fit(&history(&[10.0, 12.0, 9.0, 15.0, 11.0])).unwrap();
        let points = m.predict(3).unwrap();
        let widths: Vec<f64> = points[5..]
            .iter()
            .map(|p| p.upper_bound - p.lower_bound)
            .collect();
        assert!(widths[0] < widths[1] && widths[1] < widths[2]);
    }

    #[test]
    fn constant_history_forecasts_constant_with_zero_width() {
        let mut m = model();
        m.fit(&history(&[7.0; 10])).unwrap();
        for p in m.predict(14).unwrap() {
            assert!((p.estimate - 7.0).abs() < 1e-12);
            assert!((p.upper_bound - p.lower_bound).abs() < 1e-12);
        }
    }

    #[test]
    fn linear_history_extrapolates_trend() {
        let mut m = model();
        m.fit(&history(&[1.0, 2.0, 3.0, 4.0, 5.0])).unwrap();
        let points = m.predict(2).unwrap();
        for (p, expected) in points.iter().zip([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]) {
            assert!((p.estimate - expected).abs() < 1e-9, "{p:?}");
        }
    }

    #[test]
    fn two_points_are_enough() {
        let mut m = model();
        m.fit(&history(&[1.0, 2.0])).unwrap();
        assert_eq!(m.predict(14).unwrap().len(), 16);
    }

    #[test]
    fn rejects_short_history() {
        let mut m = model();
        assert_eq!(
            m.fit(&history(&[1.0])),
            Err(ForecastError::InsufficientHistory {
                required: 2,
                actual: 1
            })
        );
        assert_eq!(m.predict(1), Err(ForecastError::NotFitted));
    }

    #[test]
    fn rejects_unordered_or_non_finite_history() {
        let mut m = model();
        let unordered = vec![(day(1), 1.0), (day(0), 2.0)];
        assert!(matches!(m.fit(&unordered), Err(ForecastError::InvalidHistory(_))));
        assert!(matches!(
            m.fit(&history(&[1.0, f64::NAN])),
            Err(ForecastError::InvalidHistory(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_parameters() {
        assert!(HoltForecaster::new(0.0, 0.3, 0.8).is_err());
        assert!(HoltForecaster::new(0.5, 1.0, 0.8).is_err());
        assert!(HoltForecaster::new(0.5, 0.3, 1.5).is_err());
    }

    #[test]
    fn forecast_uses_case_counts_from_records() {
        let records: Vec<UnifiedRecord> = (0..5)
            .map(|i| UnifiedRecord {
                date: day(i),
                temperature: Some(20.0),
                precipitation: Some(0.0),
                case_count: Some(10.0),
                temp_norm: 0.0,
                precip_norm: 0.0,
                case_norm: 0.0,
                risk_index: 0.0,
            })
            .collect();
        let points = forecast(&mut model(), &records, FORECAST_HORIZON_DAYS).unwrap();
        assert_eq!(points.len(), records.len() + FORECAST_HORIZON_DAYS);
    }

    #[test]
    fn forecast_without_case_counts_is_insufficient() {
        let records: Vec<UnifiedRecord> = (0..60)
            .map(|i| UnifiedRecord {
                date: day(i),
                temperature: Some(25.0),
                precipitation: Some(0.0),
                case_count: None,
                temp_norm: 0.0,
                precip_norm: 0.0,
                case_norm: 0.0,
                risk_index: 0.0,
            })
            .collect();
        assert!(matches!(
            forecast(&mut model(), &records, 14),
            Err(ForecastError::InsufficientHistory { actual: 0, .. })
        ));
    }

    #[test]
    fn works_as_trait_object() {
        let mut m: Box<dyn Forecaster> = Box::new(model());
        assert_eq!(m.predict(1), Err(ForecastError::NotFitted));
        m.fit(&history(&[2.0, 4.0, 6.0])).unwrap();
        assert_eq!(m.predict(1).unwrap().len(), 4);
    }
}
