#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Series alignment, gap-filling, risk scoring, forecasting, and export.
//!
//! The stages are pure functions over value data:
//!
//! 1. [`align::align`] left-joins health observations onto the daily
//!    climate dates and gap-fills.
//! 2. [`risk::score`] rescales each signal to `[0, 1]` and averages them.
//! 3. [`forecast::forecast`] fits a [`forecast::Forecaster`] on the case
//!    series and projects it forward.
//! 4. [`export`] writes the results as delimited text.

pub mod align;
pub mod export;
pub mod forecast;
pub mod risk;

pub use export::ExportError;
pub use forecast::ForecastError;
