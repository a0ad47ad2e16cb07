use anyhow::{bail, Context, Result};
use log::{error, info, warn};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::cli::EnrichArgs;
use crate::common::{create_count_progress_bar, format_elapsed, setup_logging};
use crate::contexts::{label_missing_intents, read_context_file};
use crate::intent::{build_classifier, IntentClassifier};

/// Counters of one enrichment pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EnrichStats {
    pub files: usize,
    pub files_failed: usize,
    pub records: usize,
    pub labelled: usize,
    pub malformed: usize,
}

/// Base context files of `dir`: `*.jsonl` not already carrying `suffix`, sorted by name
pub fn base_context_files(dir: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Failed to read context directory: {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(".jsonl") && !n.ends_with(suffix))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// `<dir>/<stem><suffix>` for an input `<stem>.jsonl`
pub fn enriched_path(input: &Path, output_dir: &Path, suffix: &str) -> PathBuf {
    let name = input.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let stem = name.strip_suffix(".jsonl").unwrap_or(name);
    output_dir.join(format!("{}{}", stem, suffix))
}

/// Label one context file and write the labelled copy. Returns (records, labelled, malformed).
pub fn enrich_file(
    input: &Path,
    output: &Path,
    classifier: &dyn IntentClassifier,
    overwrite: bool,
) -> Result<(usize, usize, usize)> {
    let (mut records, malformed) = read_context_file(input)?;
    if overwrite {
        for record in records.iter_mut() {
            record.citation_intent = None;
        }
    }
    let labelled = label_missing_intents(&mut records, classifier);

    let file = File::create(output).with_context(|| format!("Failed to create output file: {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    for record in &records {
        writeln!(writer, "{}", serde_json::to_string(record)?)?;
    }
    writer.flush()?;

    Ok((records.len(), labelled, malformed))
}

pub fn run_enrich(args: EnrichArgs) -> Result<EnrichStats> {
    let start_time = Instant::now();

    setup_logging(&args.log_level)?;

    let input_dir = PathBuf::from(&args.input);
    let output_dir = args.output.as_ref().map(PathBuf::from).unwrap_or_else(|| input_dir.clone());

    info!("Starting context intent enrichment");
    info!("Input: {}", input_dir.display());
    info!("Output: {}", output_dir.display());

    let Some(classifier) = build_classifier(
        args.classifier.classify,
        args.classifier.classifier_url.as_deref(),
        Duration::from_secs(args.classifier.classifier_timeout),
        args.classifier.classifier_concurrency,
    )?
    else {
        bail!("enrich needs a classifier: pass --classify heuristic or --classify http");
    };
    info!("Classifier: {}", classifier.name());

    fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

    let files = base_context_files(&input_dir, &args.context_suffix)?;
    info!("Found {} context files", files.len());

    let progress = create_count_progress_bar(files.len() as u64, "files");
    let mut stats = EnrichStats::default();
    for input in &files {
        let output = enriched_path(input, &output_dir, &args.context_suffix);
        match enrich_file(input, &output, classifier.as_ref(), args.overwrite) {
            Ok((records, labelled, malformed)) => {
                stats.files += 1;
                stats.records += records;
                stats.labelled += labelled;
                stats.malformed += malformed;
            }
            Err(e) => {
                error!("Failed to enrich {}: {:#}", input.display(), e);
                stats.files_failed += 1;
            }
        }
        progress.inc(1);
    }
    progress.finish_with_message("Enrichment complete");

    if stats.malformed > 0 {
        warn!("{} malformed context lines were dropped", stats.malformed);
    }

    info!("==================== FINAL SUMMARY ====================");
    info!("Total execution time: {}", format_elapsed(start_time.elapsed()));
    info!("Files enriched: {}", stats.files);
    info!("Files failed: {}", stats.files_failed);
    info!("Context records: {}", stats.records);
    info!("Records labelled: {}", stats.labelled);
    info!("========================================================");

    Ok(stats)
}
