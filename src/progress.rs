//! Progress-callback trait for per-unit pipeline events.
//!
//! Inject an `Arc<dyn HarvestProgress>` via the config builders to receive
//! real-time events as either pipeline works through its units (one report
//! per scrape unit, one file per conversion). The callback approach keeps
//! the library ignorant of terminals: the CLI forwards events to an
//! `indicatif` bar, a daemon could forward them to a channel or a database
//! row, tests just count them.

use std::sync::Arc;

/// Called by the scrape and convert pipelines as they process each unit.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Both pipelines are sequential, so implementations
/// never see concurrent calls, but the trait is `Send + Sync` to allow the
/// config structs holding it to cross threads.
pub trait HarvestProgress: Send + Sync {
    /// Called once before the first unit, with the total unit count.
    fn on_start(&self, total_units: usize) {
        let _ = total_units;
    }

    /// Called before work starts on a unit. `label` is the output file name.
    fn on_unit_start(&self, label: &str) {
        let _ = label;
    }

    /// Called when a unit completes; `bytes` is the size of the output.
    fn on_unit_done(&self, label: &str, bytes: usize) {
        let _ = (label, bytes);
    }

    /// Called when a unit is skipped because its output already exists.
    fn on_unit_skipped(&self, label: &str) {
        let _ = label;
    }

    /// Called when a unit fails non-fatally (converter pipeline only; a
    /// scrape unit failure aborts the run instead).
    fn on_unit_failed(&self, label: &str, error: &str) {
        let _ = (label, error);
    }

    /// Called once after the last unit.
    fn on_finish(&self, done: usize, skipped: usize, failed: usize) {
        let _ = (done, skipped, failed);
    }
}

/// Shared-ownership alias used in the config structs.
pub type ProgressCallback = Arc<dyn HarvestProgress>;
