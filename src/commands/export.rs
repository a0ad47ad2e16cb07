use anyhow::{Context, Result};
use log::info;
use std::time::Instant;

use crate::cli::ExportArgs;
use crate::common::{create_spinner, format_elapsed, setup_logging, ExportPaths, JsonlWriter};
use crate::dataset::{write_edges_parquet, EdgeColumns};
use crate::store::{SledDataset, SledStore};

/// Export counts
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExportStats {
    pub entries: usize,
    pub edges: usize,
}

/// Write `dataset` as full JSONL plus a Parquet edge table
pub fn export_dataset(dataset: &SledDataset, paths: &ExportPaths) -> Result<ExportStats> {
    let spinner = create_spinner("Exporting dataset...");
    let writer = JsonlWriter::spawn(&paths.entries, 1000)?;
    let mut edges = EdgeColumns::new();

    for entry in dataset.entries() {
        let entry = entry?;
        edges.push_entry(&entry);
        writer.send(serde_json::to_string(&entry)?)?;
    }

    let entries = writer.finish()?;
    spinner.set_message("Writing edge table...");
    let edges = write_edges_parquet(edges, &paths.edges)?;
    spinner.finish_with_message("Export complete");

    Ok(ExportStats { entries, edges })
}

pub fn run_export(args: ExportArgs) -> Result<ExportStats> {
    let start_time = Instant::now();

    setup_logging(&args.log_level)?;

    let paths = ExportPaths::from_base(&args.output);
    info!("Starting dataset export");
    info!("Store: {}", args.store.store);
    info!("Dataset: {}", args.store.dataset);

    let store = SledStore::open(&args.store.store)
        .with_context(|| format!("Failed to open store: {}", args.store.store))?;
    let dataset = store.dataset(&args.store.dataset)?;

    let stats = export_dataset(&dataset, &paths)?;

    info!("==================== FINAL SUMMARY ====================");
    info!("Total execution time: {}", format_elapsed(start_time.elapsed()));
    info!("Entries written: {}", stats.entries);
    info!("Edges written: {}", stats.edges);
    info!("Entries file: {}", paths.entries.display());
    info!("Edges file: {}", paths.edges.display());
    info!("========================================================");

    Ok(stats)
}
