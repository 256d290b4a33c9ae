//! One region selection: prompt (if needed), run the pipeline, print the
//! headline metrics, and optionally write the output files.

use std::path::Path;

use climate_health_cli_utils::{IndicatifProgress, MultiProgress};
use climate_health_config::Settings;
use climate_health_dashboard::pipeline::{Pipeline, write_outputs};
use climate_health_dashboard_models::Report;
use climate_health_geography::Boundaries;
use climate_health_source::climate::NasaPower;
use climate_health_source::health::GhoHealth;
use dialoguer::Select;

/// Runs the pipeline for `region`, prompting for it when `None`.
///
/// # Errors
///
/// Returns an error if the prompt fails, a provider client cannot be
/// built, any pipeline stage fails, or the outputs cannot be written.
pub async fn run(
    multi: &MultiProgress,
    settings: &Settings,
    boundaries: &Boundaries,
    region: Option<String>,
    out_dir: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let region = match region {
        Some(region) => region,
        None => select_region(boundaries)?,
    };

    let climate = NasaPower::new(settings.climate.clone())?;
    let health = GhoHealth::new(settings.health.clone())?;
    let pipeline = Pipeline::new(
        boundaries,
        &climate,
        &health,
        settings.health.scope(),
        settings.pipeline,
    );

    let today = chrono::Local::now().date_naive();
    let progress = IndicatifProgress::steps_bar(multi, "Starting");

    let report = match pipeline.run(&region, today, progress.as_ref()).await {
        Ok(report) => report,
        Err(e) => {
            log::error!("Run for {region} failed at stage '{}': {e}", e.stage());
            return Err(e.into());
        }
    };

    print_report(&report);

    if let Some(out_dir) = out_dir {
        for path in write_outputs(&report, boundaries, out_dir)? {
            println!("Wrote {}", path.display());
        }
    }

    Ok(())
}

fn select_region(boundaries: &Boundaries) -> Result<String, dialoguer::Error> {
    let names = boundaries.names();
    let idx = Select::new()
        .with_prompt("Select a region")
        .items(&names)
        .default(0)
        .interact()?;
    Ok(names[idx].to_string())
}

fn print_report(report: &Report) {
    let summary = &report.summary;

    println!();
    println!(
        "{} ({:.4}, {:.4}), {} to {}",
        report.region,
        report.centroid.latitude,
        report.centroid.longitude,
        report.window.start(),
        report.window.end()
    );
    println!("  Mean temperature:   {}", metric(summary.mean_temperature, "°C"));
    println!("  Mean precipitation: {}", metric(summary.mean_precipitation, "mm"));
    println!("  Mean case count:    {}", metric(summary.mean_case_count, ""));
    println!("  Latest risk index:  {}", metric(summary.latest_risk_index, ""));

    if let Some(last) = report.forecast.last() {
        println!(
            "  Forecast for {}: {:.2} [{:.2}, {:.2}]",
            last.date, last.estimate, last.lower_bound, last.upper_bound
        );
    }
}

fn metric(value: Option<f64>, unit: &str) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2} {unit}").trim_end().to_string())
}
