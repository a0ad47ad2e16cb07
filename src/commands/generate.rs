use anyhow::{anyhow, Context, Result};
use log::{info, warn};
use std::path::Path;
use std::time::{Duration, Instant};

use crate::cli::GenerateArgs;
use crate::common::{create_count_progress_bar, create_spinner, format_elapsed, resolve_threads, setup_logging};
use crate::contexts::load_contexts;
use crate::dataset::{input_files, AssemblyOptions, GenerateOptions, GenerateReport, Generator};
use crate::intent::build_classifier;
use crate::store::SledStore;

pub fn run_generate(args: GenerateArgs) -> Result<GenerateReport> {
    let start_time = Instant::now();

    setup_logging(&args.log_level)?;

    let options = GenerateOptions {
        assembly: AssemblyOptions {
            shape: args.shape,
            attach_canonical_doi: args.attach_canonical_doi,
        },
        skip_existing: args.skip_existing,
        fresh_start: args.fresh_start,
        reset_parsed: args.reset_parsed,
        threads: resolve_threads(args.threads),
        history_limit: args.history_limit,
    };

    info!("Starting dataset generation");
    info!("Input: {}", args.input);
    info!("Store: {}", args.store.store);
    info!("Dataset: {}", args.store.dataset);
    info!("Contexts: {}", args.contexts.as_deref().unwrap_or("none"));
    info!("Shape: {:?}", options.assembly.shape);
    info!("Threads: {}", options.threads);

    let store = SledStore::open(&args.store.store)
        .with_context(|| format!("Failed to open store: {}", args.store.store))?;

    let classifier = build_classifier(
        args.classifier.classify,
        args.classifier.classifier_url.as_deref(),
        Duration::from_secs(args.classifier.classifier_timeout),
        args.classifier.classifier_concurrency,
    )?;

    let contexts = match &args.contexts {
        Some(dir) => {
            let (index, stats) = load_contexts(Path::new(dir), &args.context_suffix, classifier.as_deref())?;
            if stats.files == 0 {
                warn!("No context files ending in '{}' found in {}", args.context_suffix, dir);
            }
            if stats.malformed > 0 || stats.files_failed > 0 {
                warn!("Skipped {} malformed context lines and {} unreadable files", stats.malformed, stats.files_failed);
            }
            Some(index)
        }
        None => None,
    };

    let files = input_files(Path::new(&args.input))
        .with_context(|| format!("Failed to read input directory: {}", args.input))?;
    info!("Found {} citing-paper files", files.len());

    let mut generator = Generator::new(&store, &args.store.dataset, options)?;
    if args.preload_corpus {
        let spinner = create_spinner("Loading corpus into memory...");
        let index = store.load_corpus_index()?;
        spinner.finish_with_message(format!(
            "Loaded {} canonical records ({} identifiers, {} titles)",
            index.len(),
            index.identifier_count(),
            index.title_count()
        ));
        generator = generator.with_corpus(Box::new(index));
    }
    if let Some(index) = &contexts {
        generator = generator.with_contexts(index);
    }

    let progress = create_count_progress_bar(files.len() as u64, "files");
    let generator = generator.with_progress(progress.clone());
    let mut report = generator.run(&files)?;
    progress.finish_with_message("Generation complete");
    store.flush()?;

    report.invariants.log();

    let run = &report.snapshot.last_run;
    let totals = &report.snapshot.totals;
    info!("==================== FINAL SUMMARY ====================");
    info!("Total execution time: {}", format_elapsed(start_time.elapsed()));
    info!("Run: {} of lineage '{}'", report.snapshot.total_runs, report.snapshot.lineage);
    info!("Papers checked: {}", run.papers_checked);
    info!("Papers inserted: {}", run.papers_inserted);
    info!("Papers skipped (existing): {}", run.papers_skipped_existing);
    info!("Papers skipped (no citations): {}", report.delta.counters.papers_skipped_no_citations);
    info!("Files already parsed: {}", run.files_already_parsed);
    info!("Files without canonical record: {}", run.files_unmatched);
    info!("Files failed: {}", run.files_failed);
    info!("References checked: {}", report.delta.counters.refs_checked);
    info!("Citations added: {}", report.delta.counters.citations);
    if contexts.is_some() {
        info!("Citation contexts added: {}", report.delta.counters.contexts_added);
    }
    info!("Dataset papers (all runs): {}", totals.papers);
    info!("Citations (all runs): {}", totals.citations);
    info!("Invariants: {}", if report.invariants.all_passed() { "all passed" } else { "FAILED" });
    info!("========================================================");

    if let Some(fatal) = report.fatal.take() {
        return Err(anyhow!(fatal).context("Generation aborted; statistics of completed files were saved"));
    }

    Ok(report)
}
