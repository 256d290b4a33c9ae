//! Delimited-text export of the unified table and the forecast.
//!
//! Columns follow the struct field names. A missing value is written as an
//! empty field and reads back as `None`.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use climate_health_fusion_models::{ForecastPoint, UnifiedRecord};
use serde::Serialize;
use thiserror::Error;

/// Errors raised while writing or reading exports.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Encoding or decoding a row failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes the unified table with a header row.
///
/// # Errors
///
/// Returns [`ExportError`] if a row cannot be written.
pub fn write_records<W: Write>(writer: W, records: &[UnifiedRecord]) -> Result<(), ExportError> {
    write_rows(writer, records)
}

/// Writes the forecast with a header row.
///
/// # Errors
///
/// Returns [`ExportError`] if a row cannot be written.
pub fn write_forecast<W: Write>(writer: W, points: &[ForecastPoint]) -> Result<(), ExportError> {
    write_rows(writer, points)
}

/// Reads a unified table previously written by [`write_records`].
///
/// # Errors
///
/// Returns [`ExportError::Csv`] on malformed rows.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<UnifiedRecord>, ExportError> {
    let mut reader = csv::ReaderBuilder::new().from_reader(reader);
    let records = reader
        .deserialize()
        .collect::<Result<Vec<UnifiedRecord>, csv::Error>>()?;
    Ok(records)
}

/// Writes the unified table to `path`, creating or truncating it.
///
/// # Errors
///
/// Returns [`ExportError`] if the file cannot be created or written.
pub fn write_records_file(path: &Path, records: &[UnifiedRecord]) -> Result<(), ExportError> {
    write_records(BufWriter::new(File::create(path)?), records)?;
    log::info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

/// Writes the forecast to `path`, creating or truncating it.
///
/// # Errors
///
/// Returns [`ExportError`] if the file cannot be created or written.
pub fn write_forecast_file(path: &Path, points: &[ForecastPoint]) -> Result<(), ExportError> {
    write_forecast(BufWriter::new(File::create(path)?), points)?;
    log::info!("Wrote {} forecast points to {}", points.len(), path.display());
    Ok(())
}

fn write_rows<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<(), ExportError> {
    let mut writer = csv::WriterBuilder::new().from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
