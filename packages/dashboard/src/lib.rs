#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Pipeline orchestration, report assembly, and the risk map layer.
//!
//! [`pipeline::Pipeline`] drives one region selection end to end and
//! returns a [`climate_health_dashboard_models::Report`];
//! [`pipeline::write_outputs`] persists it as delimited text plus a
//! `GeoJSON` choropleth layer.

pub mod assemble;
pub mod map_layer;
pub mod pipeline;
pub mod progress;

pub use pipeline::{Pipeline, PipelineError};
