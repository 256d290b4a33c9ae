#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Layered settings for the climate-health pipeline.
//!
//! Resolution order, later layers winning:
//!
//! 1. `config/default.toml`, baked into the binary with [`include_str!`]
//! 2. a user TOML file (`--config <path>`); every key is optional
//! 3. environment overrides ([`BOUNDARIES_ENV`], [`HEALTH_ISO_ENV`])

use std::path::{Path, PathBuf};

use climate_health_dashboard_models::PipelineSettings;
use climate_health_source_models::{ClimateProviderConfig, HealthProviderConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default settings compiled into the binary.
pub const DEFAULT_TOML: &str = include_str!("../config/default.toml");

/// Overrides the boundary file path.
pub const BOUNDARIES_ENV: &str = "CLIMATE_HEALTH_BOUNDARIES";

/// Overrides the health scope ISO code.
pub const HEALTH_ISO_ENV: &str = "CLIMATE_HEALTH_HEALTH_ISO";

/// Errors that can occur while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file could not be read.
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The settings are not valid TOML or do not match the schema.
    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Where the region boundaries come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundarySettings {
    /// `GeoJSON` `FeatureCollection` of first-level regions.
    pub path: PathBuf,
    /// Feature property holding the region name.
    pub name_property: String,
}

impl Default for BoundarySettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/east_africa_admin1.geojson"),
            name_property: "NAME_1".to_string(),
        }
    }
}

/// All settings for a run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Boundary reference data.
    pub boundaries: BoundarySettings,
    /// Climate provider.
    pub climate: ClimateProviderConfig,
    /// Health provider.
    pub health: HealthProviderConfig,
    /// Window, horizon and forecaster tunables.
    pub pipeline: PipelineSettings,
}

impl Settings {
    /// Loads settings from `path`, or the embedded defaults when `None`,
    /// then applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = match path {
            Some(path) => {
                let contents =
                    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                        path: path.to_path_buf(),
                        source,
                    })?;
                log::info!("Loading settings from {}", path.display());
                Self::from_toml_str(&contents)?
            }
            None => Self::from_toml_str(DEFAULT_TOML)?,
        };
        settings.apply_overrides(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Parses settings from TOML. Missing keys take their default values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] on malformed input.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Applies the environment overrides using `lookup` to read variables.
    /// Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = lookup(BOUNDARIES_ENV) {
            log::debug!("{BOUNDARIES_ENV} overrides boundary path with {path}");
            self.boundaries.path = PathBuf::from(path);
        }
        if let Some(iso) = lookup(HEALTH_ISO_ENV) {
            log::debug!("{HEALTH_ISO_ENV} overrides health scope with {iso}");
            self.health.iso = iso.trim().to_uppercase();
        }
    }
}
