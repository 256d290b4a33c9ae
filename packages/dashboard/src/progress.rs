//! Stage progress reporting.
//!
//! The pipeline reports through [`ProgressCallback`] without knowing how
//! (or whether) progress is rendered. The CLI plugs in an `indicatif` bar;
//! tests and library callers use [`NullProgress`].

/// Receives progress updates from a pipeline run.
///
/// Implementations must be `Send + Sync` so a run can be awaited on any
/// runtime worker.
pub trait ProgressCallback: Send + Sync {
    /// Sets the total number of stages.
    fn set_total(&self, total: u64);

    /// Advances by `delta` stages.
    fn inc(&self, delta: u64);

    /// Updates the label shown for the current stage.
    fn set_message(&self, msg: String);

    /// Marks the run as finished with a final message.
    fn finish(&self, msg: String);
}

/// A [`ProgressCallback`] that ignores every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}
