//! Process-wide boundary cache.
//!
//! The boundary file is parsed on first access and kept for the lifetime of
//! the process. Later calls return the cached value regardless of the path
//! they pass; the cache is only invalidated by restarting the process.

use std::path::Path;
use std::sync::OnceLock;

use crate::{Boundaries, GeoError};

static BOUNDARIES: OnceLock<Boundaries> = OnceLock::new();

/// Returns the cached boundaries, loading them from `path` on first use.
///
/// A failed load is not cached, so the next call retries the read.
///
/// # Errors
///
/// Returns [`GeoError`] if the boundaries are not cached yet and the file
/// cannot be loaded.
pub fn boundaries(path: &Path, name_property: &str) -> Result<&'static Boundaries, GeoError> {
    if let Some(cached) = BOUNDARIES.get() {
        return Ok(cached);
    }

    let loaded = Boundaries::load(path, name_property)?;
    Ok(BOUNDARIES.get_or_init(|| loaded))
}
