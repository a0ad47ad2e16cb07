use anyhow::{bail, Context, Result};
use log::{info, warn};
use std::time::Instant;

use crate::cli::StatsArgs;
use crate::common::{format_elapsed, setup_logging};
use crate::stats::{log_snapshot, validate, InvariantReport};
use crate::store::SledStore;

const HISTORY_SHOWN: usize = 5;

pub fn run_stats(args: StatsArgs) -> Result<Option<InvariantReport>> {
    let start_time = Instant::now();

    setup_logging(&args.log_level)?;

    let store = SledStore::open(&args.store.store)
        .with_context(|| format!("Failed to open store: {}", args.store.store))?;

    let Some(snapshot) = store.load_stats(&args.store.dataset)? else {
        warn!("No statistics recorded for dataset '{}'", args.store.dataset);
        return Ok(None);
    };

    log_snapshot(&snapshot);

    let shown = snapshot.run_history.len().min(HISTORY_SHOWN);
    info!("-- last {} runs --", shown);
    for run in snapshot.run_history.iter().rev().take(HISTORY_SHOWN) {
        info!(
            "  {} {} checked={} inserted={} skipped_existing={} citations={}",
            run.timestamp,
            run.run_id,
            run.papers_checked,
            run.papers_inserted,
            run.papers_skipped_existing,
            run.citations_added
        );
    }

    let report = validate(&snapshot.totals);
    report.log();

    let dataset_len = store.dataset(&args.store.dataset)?.len();

    info!("==================== FINAL SUMMARY ====================");
    info!("Total execution time: {}", format_elapsed(start_time.elapsed()));
    info!("Dataset: {}", snapshot.lineage);
    info!("Entries stored: {}", dataset_len);
    info!("Runs recorded: {}", snapshot.total_runs);
    info!("Invariants failed: {}", report.failures().count());
    info!("========================================================");

    if args.strict && !report.all_passed() {
        bail!("{} statistics invariants failed", report.failures().count());
    }

    Ok(Some(report))
}
