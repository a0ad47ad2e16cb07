//! Cross-run statistics of a dataset lineage.
//!
//! A run takes the stored snapshot at start, counts into a running [`Tally`] seeded from
//! it, and writes [`update`]`(initial, current)` back exactly once when it finishes.

pub mod aggregate;
pub mod snapshot;
pub mod validate;

pub use aggregate::*;
pub use snapshot::*;
pub use validate::*;

use log::info;

/// Log a snapshot's counters as a bordered block
pub fn log_snapshot(snapshot: &StatsSnapshot) {
    info!("==== STATISTICS: {} ====", snapshot.lineage);
    info!("Total runs: {}", snapshot.total_runs);
    info!("-- cumulative --");
    for (name, value) in snapshot.totals.fields() {
        info!("  {:<32} {}", name, value);
    }
    info!("-- last run --");
    for (name, value) in snapshot.last_run.fields() {
        info!("  {:<32} {}", name, value);
    }
    info!("Updated at: {}", snapshot.updated_at);
}
