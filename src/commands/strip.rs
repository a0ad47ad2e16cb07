use anyhow::{Context, Result};
use log::info;
use rayon::prelude::*;
use std::path::Path;
use std::time::Instant;

use crate::cli::StripArgs;
use crate::common::{create_count_progress_bar, format_elapsed, setup_logging, JsonlWriter};
use crate::dataset::{strip_with, DatasetEntry, StripOptions, StripStats};
use crate::store::{SledDataset, SledStore};

const STRIP_CHUNK: usize = 10_000;

fn strip_chunk(
    chunk: &[DatasetEntry],
    options: &StripOptions,
    writer: Option<&JsonlWriter>,
) -> Result<StripStats> {
    let stripped: Vec<(String, StripStats)> = chunk
        .par_iter()
        .map(|entry| -> Result<(String, StripStats)> {
            let (stripped, stats) = strip_with(entry, options);
            Ok((serde_json::to_string(&stripped)?, stats))
        })
        .collect::<Result<_>>()?;

    let mut total = StripStats::default();
    for (line, stats) in stripped {
        total += stats;
        if let Some(writer) = writer {
            writer.send(line)?;
        }
    }
    Ok(total)
}

/// Strip every entry of `dataset`, in key order, into `output` (statistics only when `None`)
pub fn strip_dataset(dataset: &SledDataset, output: Option<&Path>, options: &StripOptions) -> Result<StripStats> {
    let progress = create_count_progress_bar(dataset.len() as u64, "entries");
    let writer = output.map(|path| JsonlWriter::spawn(path, 1000)).transpose()?;

    let mut stats = StripStats::default();
    let mut chunk = Vec::with_capacity(STRIP_CHUNK);
    for entry in dataset.entries() {
        chunk.push(entry?);
        if chunk.len() == STRIP_CHUNK {
            stats += strip_chunk(&chunk, options, writer.as_ref())?;
            progress.inc(chunk.len() as u64);
            chunk.clear();
        }
    }
    stats += strip_chunk(&chunk, options, writer.as_ref())?;
    progress.inc(chunk.len() as u64);
    progress.finish_with_message("Stripping complete");

    if let Some(writer) = writer {
        let written = writer.finish()?;
        info!("Wrote {} stripped entries", written);
    }
    Ok(stats)
}

pub fn run_strip(args: StripArgs) -> Result<StripStats> {
    let start_time = Instant::now();

    setup_logging(&args.log_level)?;

    info!("Starting dataset strip");
    info!("Store: {}", args.store.store);
    info!("Dataset: {}", args.store.dataset);
    if args.dry_run {
        info!("Dry run: statistics only");
    } else {
        info!("Output: {}", args.output);
    }

    let store = SledStore::open(&args.store.store)
        .with_context(|| format!("Failed to open store: {}", args.store.store))?;
    let dataset = store.dataset(&args.store.dataset)?;

    let options = StripOptions { drop_raw_text: args.drop_raw_text };
    let output = (!args.dry_run).then(|| Path::new(&args.output));
    let stats = strip_dataset(&dataset, output, &options)?;

    info!("==================== FINAL SUMMARY ====================");
    info!("Total execution time: {}", format_elapsed(start_time.elapsed()));
    info!("Papers: {}", stats.papers);
    info!("  with contexts: {}", stats.papers_with_contexts);
    info!("  without contexts: {}", stats.papers_without_contexts);
    info!("Cited references with contexts: {}", stats.cited_with_contexts);
    info!("Cited references without contexts: {}", stats.cited_without_contexts);
    info!("Citations stripped: {}", stats.citations_stripped);
    if !args.dry_run {
        info!("Output file: {}", args.output);
    }
    info!("========================================================");

    Ok(stats)
}
