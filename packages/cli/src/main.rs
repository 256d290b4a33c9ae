#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for the climate-health risk pipeline.
//!
//! `run --region <NAME>` processes one region non-interactively; without a
//! region (or without a subcommand) the region is picked from a
//! `dialoguer` list. `regions` prints the known region set.
//!
//! Uses `indicatif-log-bridge` (via [`climate_health_cli_utils::init_logger`])
//! so log lines and the stage bar do not interleave.

mod run;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use climate_health_config::Settings;
use climate_health_geography::cache;

#[derive(Parser)]
#[command(name = "climate_health", about = "Climate-health risk pipeline")]
struct Cli {
    /// Settings file (TOML). Defaults to the built-in settings.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the known regions
    Regions,
    /// Fetch, score and forecast one region
    Run {
        /// Region name as it appears in the boundary file. Prompts when omitted.
        #[arg(long)]
        region: Option<String>,
        /// Write `unified.csv`, `forecast.csv` and `risk_map.geojson` here
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = climate_health_cli_utils::init_logger();
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref())?;
    let boundaries = cache::boundaries(
        &settings.boundaries.path,
        &settings.boundaries.name_property,
    )?;

    match cli.command {
        Some(Commands::Regions) => {
            for name in boundaries.names() {
                println!("{name}");
            }
        }
        Some(Commands::Run { region, out_dir }) => {
            run::run(&multi, &settings, boundaries, region, out_dir.as_deref()).await?;
        }
        None => run::run(&multi, &settings, boundaries, None, None).await?,
    }

    Ok(())
}
