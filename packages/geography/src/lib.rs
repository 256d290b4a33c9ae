#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Region boundary loading, caching, and centroid resolution.
//!
//! Reads first-level administrative boundaries from a `GeoJSON`
//! `FeatureCollection`, merges features that share a region name, and
//! resolves a region name to the representative point used when querying
//! the climate provider. The parsed boundaries are cached process-wide
//! (see [`cache`]) so repeated region selections never re-read the file.

pub mod boundaries;
pub mod cache;

use std::path::PathBuf;

pub use boundaries::Boundaries;
use thiserror::Error;

/// Errors that can occur during geography operations.
#[derive(Debug, Error)]
pub enum GeoError {
    /// The boundary file could not be read.
    #[error("Failed to read boundary file {}: {source}", path.display())]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The boundary file is not valid `GeoJSON`.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The requested region is not part of the known region set.
    #[error("Unknown region: {name}")]
    UnknownRegion {
        /// The identifier that failed to match.
        name: String,
    },

    /// Data conversion error.
    #[error("Conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}
