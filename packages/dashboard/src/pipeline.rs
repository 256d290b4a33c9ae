//! Region-to-report orchestration.
//!
//! A run resolves the region, fetches the climate and health series
//! concurrently, aligns and scores them, fits the forecaster, and assembles
//! the [`Report`]. Any failure aborts the run; [`PipelineError::stage`]
//! names the step that failed.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use climate_health_dashboard_models::{PipelineSettings, Report, Stage};
use climate_health_fusion::forecast::{self, HoltForecaster};
use climate_health_fusion::{ExportError, ForecastError, align, export, risk};
use climate_health_geography::{Boundaries, GeoError};
use climate_health_source::{ClimateSource, HealthSource, SourceError};
use climate_health_source_models::{DateWindow, HealthScope, WindowError};
use thiserror::Error;

use crate::progress::ProgressCallback;
use crate::{assemble, map_layer};

/// File name of the unified table export.
pub const UNIFIED_FILE_NAME: &str = "unified.csv";
/// File name of the forecast export.
pub const FORECAST_FILE_NAME: &str = "forecast.csv";
/// File name of the choropleth layer.
pub const RISK_MAP_FILE_NAME: &str = "risk_map.geojson";

/// A failed pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The region could not be resolved.
    #[error(transparent)]
    Region(#[from] GeoError),

    /// The date window could not be built.
    #[error(transparent)]
    Window(#[from] WindowError),

    /// The climate series could not be fetched or parsed.
    #[error(transparent)]
    Climate(SourceError),

    /// The health series could not be fetched.
    #[error(transparent)]
    Health(SourceError),

    /// The forecaster could not be built or fitted.
    #[error(transparent)]
    Forecast(#[from] ForecastError),

    /// An output file could not be written.
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl PipelineError {
    /// The stage that failed.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        match self {
            Self::Region(_) | Self::Window(_) => Stage::Resolve,
            Self::Climate(_) => Stage::Climate,
            Self::Health(_) => Stage::Health,
            Self::Forecast(_) => Stage::Forecast,
            Self::Export(_) => Stage::Export,
        }
    }
}

/// Stages reported by [`Pipeline::run`]; export is driven separately.
const RUN_STAGES: u64 = 7;

/// Wires the boundary set and the two providers into one run.
pub struct Pipeline<'a> {
    boundaries: &'a Boundaries,
    climate: &'a dyn ClimateSource,
    health: &'a dyn HealthSource,
    scope: HealthScope,
    settings: PipelineSettings,
}

impl<'a> Pipeline<'a> {
    /// Creates a pipeline over borrowed providers.
    #[must_use]
    pub const fn new(
        boundaries: &'a Boundaries,
        climate: &'a dyn ClimateSource,
        health: &'a dyn HealthSource,
        scope: HealthScope,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            boundaries,
            climate,
            health,
            scope,
            settings,
        }
    }

    /// Runs every stage for `region` over the window ending on `today`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] tagged with the failed stage: an unknown
    /// region, a failed or malformed fetch, or a case history too short to
    /// forecast. An empty health series is not an error; the report then
    /// carries no forecast.
    pub async fn run(
        &self,
        region: &str,
        today: NaiveDate,
        progress: &dyn ProgressCallback,
    ) -> Result<Report, PipelineError> {
        progress.set_total(RUN_STAGES);
        let result = self.run_stages(region, today, progress).await;
        match &result {
            Ok(report) => progress.finish(format!("Report ready for {}", report.region)),
            Err(e) => progress.finish(format!("{} failed", e.stage())),
        }
        result
    }

    async fn run_stages(
        &self,
        region: &str,
        today: NaiveDate,
        progress: &dyn ProgressCallback,
    ) -> Result<Report, PipelineError> {
        enter(progress, Stage::Resolve);
        let point = self.boundaries.resolve(region)?;
        let window = DateWindow::ending_on(today, self.settings.window_days)?;
        log::info!(
            "Resolved {region} to ({:.4}, {:.4}); window {} to {}",
            point.latitude,
            point.longitude,
            window.start(),
            window.end()
        );
        progress.inc(1);

        progress.set_message(format!(
            "{} / {}",
            Stage::Climate.label(),
            Stage::Health.label()
        ));
        let (climate, health) = tokio::try_join!(
            async {
                self.climate
                    .fetch_climate(point, window)
                    .await
                    .map_err(PipelineError::Climate)
            },
            async {
                self.health
                    .fetch_health(&self.scope)
                    .await
                    .map_err(PipelineError::Health)
            },
        )?;
        log::info!(
            "Fetched {} climate days from {} and {} health observations from {}",
            climate.len(),
            self.climate.id(),
            health.len(),
            self.health.id()
        );
        progress.inc(2);

        enter(progress, Stage::Align);
        let records = align::align(climate, &health);
        progress.inc(1);

        enter(progress, Stage::Score);
        let records = risk::score(records);
        progress.inc(1);

        enter(progress, Stage::Forecast);
        let mut model = HoltForecaster::new(
            self.settings.alpha,
            self.settings.beta,
            self.settings.interval_width,
        )?;
        let points = if health.is_empty() {
            log::warn!(
                "No health observations for {}; skipping the case forecast",
                self.scope.iso
            );
            Vec::new()
        } else {
            forecast::forecast(&mut model, &records, self.settings.horizon_days)?
        };
        progress.inc(1);

        enter(progress, Stage::Assemble);
        let report = assemble::assemble(
            region,
            point,
            self.boundaries.regions(),
            window,
            records,
            points,
        );
        progress.inc(1);

        Ok(report)
    }
}

fn enter(progress: &dyn ProgressCallback, stage: Stage) {
    log::debug!("Entering stage {stage}");
    progress.set_message(stage.label().to_string());
}

/// Writes the unified table, the forecast and the risk map into `out_dir`,
/// creating the directory if needed. Returns the written paths.
///
/// # Errors
///
/// Returns [`PipelineError::Export`] if any file cannot be written.
pub fn write_outputs(
    report: &Report,
    boundaries: &Boundaries,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, PipelineError> {
    std::fs::create_dir_all(out_dir).map_err(ExportError::from)?;

    let unified = out_dir.join(UNIFIED_FILE_NAME);
    export::write_records_file(&unified, &report.records)?;

    let forecast = out_dir.join(FORECAST_FILE_NAME);
    export::write_forecast_file(&forecast, &report.forecast)?;

    let risk_map = out_dir.join(RISK_MAP_FILE_NAME);
    let layer = map_layer::risk_map(boundaries.regions(), &report.map);
    map_layer::write_risk_map(&risk_map, &layer).map_err(ExportError::from)?;

    Ok(vec![unified, forecast, risk_map])
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Days;
    use climate_health_geography_models::Coordinates;
    use climate_health_source::http::HttpError;
    use climate_health_source_models::{ClimateObservation, HealthObservation};

    use super::*;
    use crate::progress::NullProgress;

    const REGIONS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "NAME_1": "Nairobi" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[36.6, -1.45], [37.1, -1.45], [37.1, -1.15], [36.6, -1.15], [36.6, -1.45]]]
                }
            },
            {
                "type": "Feature",
                "properties": { "NAME_1": "Mombasa" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[39.5, -4.2], [39.8, -4.2], [39.8, -3.9], [39.5, -3.9], [39.5, -4.2]]]
                }
            }
        ]
    }"#;

    fn boundaries() -> Boundaries {
        Boundaries::from_geojson_str(REGIONS, "NAME_1").unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
    }

    /// Daily climate built from a per-day function; records the queried point.
    struct FakeClimate {
        temperature: fn(usize) -> f64,
        queried: Mutex<Option<Coordinates>>,
        fail: bool,
    }

    impl FakeClimate {
        fn new(temperature: fn(usize) -> f64) -> Self {
            Self {
                temperature,
                queried: Mutex::new(None),
                fail: false,
            }
        }
    }

    #[async_trait]
    impl ClimateSource for FakeClimate {
        fn id(&self) -> &str {
            "fake_climate"
        }

        async fn fetch_climate(
            &self,
            point: Coordinates,
            window: DateWindow,
        ) -> Result<Vec<ClimateObservation>, SourceError> {
            *self.queried.lock().unwrap() = Some(point);
            if self.fail {
                return Err(SourceError::ClimateParse {
                    message: "missing properties.parameter".to_string(),
                });
            }
            Ok(window
                .days()
                .enumerate()
                .map(|(i, date)| ClimateObservation {
                    date,
                    temperature: Some((self.temperature)(i)),
                    precipitation: Some(0.0),
                })
                .collect())
        }
    }

    struct FakeHealth {
        observations: Vec<HealthObservation>,
        fail: bool,
    }

    #[async_trait]
    impl HealthSource for FakeHealth {
        fn id(&self) -> &str {
            "fake_health"
        }

        async fn fetch_health(
            &self,
            _scope: &HealthScope,
        ) -> Result<Vec<HealthObservation>, SourceError> {
            if self.fail {
                let json = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
                return Err(SourceError::HealthFetch(HttpError::Json(json)));
            }
            Ok(self.observations.clone())
        }
    }

    fn health(observations: Vec<HealthObservation>) -> FakeHealth {
        FakeHealth {
            observations,
            fail: false,
        }
    }

    fn scope() -> HealthScope {
        HealthScope {
            indicator: "WHS4_159".to_string(),
            iso: "KEN".to_string(),
        }
    }

    #[tokio::test]
    async fn empty_health_series_still_produces_report() {
        let boundaries = boundaries();
        let climate = FakeClimate::new(|_| 25.0);
        let health = health(Vec::new());
        let pipeline = Pipeline::new(
            &boundaries,
            &climate,
            &health,
            scope(),
            PipelineSettings::default(),
        );

        let report = pipeline.run("Nairobi", today(), &NullProgress).await.unwrap();

        assert_eq!(report.records.len(), 61);
        assert!(report.records.iter().all(|r| r.case_count.is_none()));
        assert!(report.records.iter().all(|r| r.risk_index.abs() < f64::EPSILON));
        assert!(report.forecast.is_empty());
        assert_eq!(report.summary.mean_case_count, None);
        assert_eq!(report.summary.latest_risk_index, Some(0.0));
    }

    #[tokio::test]
    async fn single_health_value_is_enough_to_forecast() {
        let boundaries = boundaries();
        let climate = FakeClimate::new(|_| 25.0);
        let health = health(vec![HealthObservation {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            case_count: 8.0,
        }]);
        let report = Pipeline::new(&boundaries, &climate, &health, scope(), PipelineSettings::default())
            .run("Nairobi", today(), &NullProgress)
            .await
            .unwrap();

        assert_eq!(report.forecast.len(), 61 + 14);
    }

    #[tokio::test]
    async fn full_run_produces_report() {
        let boundaries = boundaries();
        #[allow(clippy::cast_precision_loss)]
        let climate = FakeClimate::new(|i| 20.0 + (i % 11) as f64);
        let health = health(vec![
            HealthObservation {
                date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
                case_count: 40.0,
            },
            HealthObservation {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                case_count: 55.0,
            },
        ]);
        let pipeline = Pipeline::new(
            &boundaries,
            &climate,
            &health,
            scope(),
            PipelineSettings::default(),
        );

        let report = pipeline.run("Mombasa", today(), &NullProgress).await.unwrap();

        assert_eq!(report.region, "Mombasa");
        assert_eq!(report.records.len(), 61);
        assert_eq!(report.records.last().unwrap().date, today());
        assert_eq!(
            report.records.first().unwrap().date,
            today().checked_sub_days(Days::new(60)).unwrap()
        );
        assert!(report.records.iter().all(|r| r.case_count == Some(55.0)));
        assert_eq!(report.forecast.len(), 61 + 14);
        assert!(report.forecast.iter().all(|p| p.lower_bound <= p.estimate && p.estimate <= p.upper_bound));

        let queried = climate.queried.lock().unwrap().unwrap();
        assert_eq!(queried, boundaries.resolve("Mombasa").unwrap());

        assert_eq!(report.map.len(), 2);
        let mombasa = report.map.iter().find(|r| r.region_name == "Mombasa").unwrap();
        assert_eq!(mombasa.date, Some(today()));
        assert_eq!(mombasa.risk_index, Some(report.records.last().unwrap().risk_index));
        let nairobi = report.map.iter().find(|r| r.region_name == "Nairobi").unwrap();
        assert!(nairobi.risk_index.is_none());
        assert_eq!(report.summary.mean_case_count, Some(55.0));
    }

    #[tokio::test]
    async fn unknown_region_fails_at_resolve_without_fetching() {
        let boundaries = boundaries();
        let climate = FakeClimate::new(|_| 25.0);
        let health = health(Vec::new());
        let pipeline = Pipeline::new(
            &boundaries,
            &climate,
            &health,
            scope(),
            PipelineSettings::default(),
        );

        let err = pipeline
            .run("Atlantis", today(), &NullProgress)
            .await
            .unwrap_err();
        assert_eq!(err.stage(), Stage::Resolve);
        assert!(climate.queried.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn provider_failures_name_their_stage() {
        let boundaries = boundaries();

        let mut climate = FakeClimate::new(|_| 25.0);
        climate.fail = true;
        let ok_health = health(Vec::new());
        let err = Pipeline::new(&boundaries, &climate, &ok_health, scope(), PipelineSettings::default())
            .run("Nairobi", today(), &NullProgress)
            .await
            .unwrap_err();
        assert_eq!(err.stage(), Stage::Climate);

        let climate = FakeClimate::new(|_| 25.0);
        let failing_health = FakeHealth {
            observations: Vec::new(),
            fail: true,
        };
        let err = Pipeline::new(&boundaries, &climate, &failing_health, scope(), PipelineSettings::default())
            .run("Nairobi", today(), &NullProgress)
            .await
            .unwrap_err();
        assert_eq!(err.stage(), Stage::Health);
        assert_eq!(err.stage().to_string(), "health");
    }

    #[tokio::test]
    async fn writes_all_outputs() {
        let boundaries = boundaries();
        let climate = FakeClimate::new(|i| if i % 2 == 0 { 21.0 } else { 27.0 });
        let health = health(vec![HealthObservation {
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            case_count: 12.0,
        }]);
        let report = Pipeline::new(&boundaries, &climate, &health, scope(), PipelineSettings::default())
            .run("Nairobi", today(), &NullProgress)
            .await
            .unwrap();

        let out_dir = std::env::temp_dir().join(format!(
            "climate_health_outputs_{}",
            std::process::id()
        ));
        let written = write_outputs(&report, &boundaries, &out_dir).unwrap();
        assert_eq!(written.len(), 3);
        assert!(written.iter().all(|p| p.exists()));

        let unified = std::fs::File::open(out_dir.join(UNIFIED_FILE_NAME)).unwrap();
        let read_back = export::read_records(unified).unwrap();
        assert_eq!(read_back.len(), report.records.len());
        assert_eq!(read_back[0].date, report.records[0].date);
        assert_eq!(read_back[0].case_count, Some(12.0));

        std::fs::remove_dir_all(&out_dir).ok();
    }
}
