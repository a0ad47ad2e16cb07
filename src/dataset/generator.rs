use indicatif::ProgressBar;
use log::{debug, error, info, warn};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use thiserror::Error;

use super::{process_paper, AssemblyOptions};
use crate::contexts::ContextIndex;
use crate::corpus::{key_norm_for_file, CorpusLookup};
use crate::stats::{delta, update, validate, InvariantReport, RunStamp, StatsSnapshot, Tally};
use crate::store::{InsertOutcome, SledDataset, SledStore, StoreError, StoreResult};

/// Failure while processing one citing-paper file
#[derive(Debug, Error)]
pub enum FileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl FileError {
    /// Whether the run must stop instead of moving on to the next file
    pub fn is_fatal(&self) -> bool {
        matches!(self, FileError::Store(e) if e.is_fatal())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateOptions {
    pub assembly: AssemblyOptions,
    /// Skip a citing paper before parsing when the dataset already holds it
    pub skip_existing: bool,
    /// Clear the lineage's dataset and statistics before the run
    pub fresh_start: bool,
    /// Clear every `parsed_flag` before the run
    pub reset_parsed: bool,
    pub threads: usize,
    pub history_limit: usize,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            assembly: AssemblyOptions::default(),
            skip_existing: false,
            fresh_start: false,
            reset_parsed: false,
            threads: 1,
            history_limit: 100,
        }
    }
}

/// What a finished (or aborted) run leaves behind
#[derive(Debug)]
pub struct GenerateReport {
    /// Snapshot as written at the end of the run
    pub snapshot: StatsSnapshot,
    /// What this run added
    pub delta: Tally,
    pub invariants: InvariantReport,
    /// Set when a fatal store error stopped the run early
    pub fatal: Option<FileError>,
}

/// Citing-paper files of `dir`: `*.json`, sorted by name
pub fn input_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    Ok(files)
}

/// One generation run over a set of citing-paper files
pub struct Generator<'a> {
    store: &'a SledStore,
    dataset: SledDataset,
    corpus: Box<dyn CorpusLookup + 'a>,
    contexts: Option<&'a ContextIndex>,
    options: GenerateOptions,
    progress: ProgressBar,
}

impl<'a> Generator<'a> {
    pub fn new(store: &'a SledStore, lineage: &str, options: GenerateOptions) -> StoreResult<Self> {
        Ok(Self {
            store,
            dataset: store.dataset(lineage)?,
            corpus: Box::new(store.clone()),
            contexts: None,
            options,
            progress: ProgressBar::hidden(),
        })
    }

    /// Resolve against another corpus view, e.g. an in-memory copy
    pub fn with_corpus(mut self, corpus: Box<dyn CorpusLookup + 'a>) -> Self {
        self.corpus = corpus;
        self
    }

    pub fn with_contexts(mut self, contexts: &'a ContextIndex) -> Self {
        self.contexts = Some(contexts);
        self
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn dataset(&self) -> &SledDataset {
        &self.dataset
    }

    /// Process one citing-paper file and return what it counted
    pub fn process_file(&self, path: &Path) -> Result<Tally, FileError> {
        let mut tally = Tally::default();

        let record = match key_norm_for_file(path) {
            Some(key_norm) => self.store.by_key_norm(&key_norm)?,
            None => None,
        };
        let Some(record) = record else {
            debug!("No canonical record for {}", path.display());
            tally.run.files_unmatched += 1;
            return Ok(tally);
        };

        if self.options.skip_existing && self.dataset.contains(&record.key)? {
            debug!("Skipping {}: already in the dataset", record.key);
            tally.run.papers_skipped_existing += 1;
            return Ok(tally);
        }
        if record.parsed_flag {
            debug!("Skipping {}: already parsed", record.key);
            tally.run.files_already_parsed += 1;
            return Ok(tally);
        }

        let paper: serde_json::Value = serde_json::from_slice(&fs::read(path)?)?;
        tally.run.papers_checked += 1;

        let assembly = process_paper(
            self.corpus.as_ref(),
            self.contexts,
            &paper,
            &record,
            &self.options.assembly,
        )?;
        tally.counters += &assembly.counters;
        self.store.set_parsed(&record.key, true)?;

        if let Some(entry) = assembly.entry {
            match self.dataset.insert(&entry)? {
                InsertOutcome::Inserted => {
                    tally.counters.papers += 1;
                    tally.run.papers_inserted += 1;
                    debug!("Inserted {} ({} cited)", record.key, entry.cited_papers.len());
                }
                InsertOutcome::SkippedExisting => {
                    tally.run.papers_skipped_existing += 1;
                    debug!("Kept existing entry for {}", record.key);
                }
            }
        }
        Ok(tally)
    }

    /// Process files with `threads` workers. A failing file is logged and counted; a
    /// fatal store error stops the remaining files and is returned with the tally so far.
    pub fn process_files(&self, files: &[PathBuf]) -> (Tally, Option<FileError>) {
        let abort = AtomicBool::new(false);
        let fatal: Mutex<Option<FileError>> = Mutex::new(None);

        let work = || {
            files
                .par_iter()
                .map(|path| {
                    let mut tally = Tally::default();
                    if abort.load(Ordering::Relaxed) {
                        return tally;
                    }
                    match self.process_file(path) {
                        Ok(counted) => tally = counted,
                        Err(e) if e.is_fatal() => {
                            error!("Fatal error on {}: {}", path.display(), e);
                            abort.store(true, Ordering::Relaxed);
                            if let Ok(mut slot) = fatal.lock() {
                                slot.get_or_insert(e);
                            }
                        }
                        Err(e) => {
                            error!("Failed to process {}: {}", path.display(), e);
                            tally.run.files_failed += 1;
                        }
                    }
                    self.progress.inc(1);
                    tally
                })
                .reduce(Tally::default, |mut a, b| {
                    a += b;
                    a
                })
        };

        let tally = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.threads.max(1))
            .build()
        {
            Ok(pool) => pool.install(work),
            Err(e) => {
                warn!("Failed to build thread pool: {}. Using the global pool.", e);
                work()
            }
        };

        let fatal = fatal.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());
        (tally, fatal)
    }

    /// Full run: optional resets, processing, then a single statistics write.
    ///
    /// Errors only when the store fails before processing starts or while writing the
    /// statistics; a fatal error during processing is reported in [`GenerateReport::fatal`]
    /// after the statistics of the completed files are saved.
    pub fn run(&self, files: &[PathBuf]) -> StoreResult<GenerateReport> {
        let lineage = self.dataset.name().to_string();

        if self.options.fresh_start {
            info!("Fresh start: clearing dataset and statistics of '{}'", lineage);
            self.dataset.clear()?;
            self.store.clear_stats(&lineage)?;
        }

        let initial = self
            .store
            .load_stats(&lineage)?
            .unwrap_or_else(|| StatsSnapshot::new(&lineage));

        if self.options.reset_parsed {
            let reset = self.store.reset_parsed()?;
            info!("Reset parsed flag on {} canonical records", reset);
        }

        let (run, fatal) = self.process_files(files);

        let mut current = initial.tally();
        current += &run;
        let snapshot = update(&initial, &current, &RunStamp::new(self.options.history_limit));
        self.store.save_stats(&lineage, &snapshot)?;

        let invariants = validate(&snapshot.totals);
        Ok(GenerateReport {
            delta: delta(&initial.tally(), &current),
            snapshot,
            invariants,
            fatal,
        })
    }
}
