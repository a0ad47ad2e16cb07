use anyhow::{Context, Result};
use log::info;
use std::time::Instant;

use crate::cli::ResetArgs;
use crate::common::{format_elapsed, setup_logging};
use crate::store::SledStore;

pub fn run_reset(args: ResetArgs) -> Result<usize> {
    let start_time = Instant::now();

    setup_logging(&args.log_level)?;

    info!("Resetting parsed flags");
    info!("Store: {}", args.store.store);

    let store = SledStore::open(&args.store.store)
        .with_context(|| format!("Failed to open store: {}", args.store.store))?;
    let reset = store.reset_parsed()?;
    store.flush()?;

    info!("==================== FINAL SUMMARY ====================");
    info!("Total execution time: {}", format_elapsed(start_time.elapsed()));
    info!("Canonical records reset: {}", reset);
    info!("========================================================");

    Ok(reset)
}
