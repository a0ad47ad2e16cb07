use anyhow::{Context, Result};
use log::{error, info, warn};
use rayon::prelude::*;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Instant;

use super::{ContextIndex, ContextRecord};
use crate::common::format_elapsed;
use crate::intent::IntentClassifier;

/// Counters of one context load
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ContextLoadStats {
    pub files: usize,
    pub files_failed: usize,
    pub records: usize,
    pub malformed: usize,
    pub classified: usize,
}

/// Files in `dir` whose name ends with `suffix`, sorted by name
pub fn context_files(dir: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Failed to read context directory: {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(suffix))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Parse one context file. Lines missing required fields are counted and skipped.
pub fn read_context_file(path: &Path) -> Result<(Vec<ContextRecord>, usize)> {
    let file = File::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut records = Vec::new();
    let mut malformed = 0;
    for (line_no, line_result) in reader.lines().enumerate() {
        let line = line_result.with_context(|| format!("Failed to read {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<ContextRecord>(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                if malformed < 5 {
                    warn!("{}:{}: skipping context line: {}", path.display(), line_no + 1, e);
                }
                malformed += 1;
            }
        }
    }
    Ok((records, malformed))
}

/// Label records that carry no intent. Returns how many were labelled.
pub fn label_missing_intents(records: &mut [ContextRecord], classifier: &dyn IntentClassifier) -> usize {
    let (positions, requests): (Vec<usize>, Vec<_>) = records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.citation_intent.is_none())
        .map(|(i, r)| (i, r.intent_request()))
        .unzip();

    let labels = classifier.predict_batch(&requests);
    for (position, label) in positions.iter().zip(labels) {
        records[*position].citation_intent = Some(label);
    }
    positions.len()
}

/// Load every context file of `dir` into an index.
///
/// Files are parsed in parallel but merged in file-name order, so citation ids only
/// depend on the input. Unreadable files are logged and skipped.
pub fn load_contexts(
    dir: &Path,
    suffix: &str,
    classifier: Option<&dyn IntentClassifier>,
) -> Result<(ContextIndex, ContextLoadStats)> {
    info!("Loading citation contexts from: {}", dir.display());
    let start = Instant::now();

    let files = context_files(dir, suffix)?;
    let parsed: Vec<(PathBuf, Result<(Vec<ContextRecord>, usize)>)> = files
        .into_par_iter()
        .map(|path| {
            let result = read_context_file(&path);
            (path, result)
        })
        .collect();

    let mut index = ContextIndex::new();
    let mut stats = ContextLoadStats::default();
    for (path, result) in parsed {
        match result {
            Ok((mut records, malformed)) => {
                stats.files += 1;
                stats.malformed += malformed;
                if let Some(classifier) = classifier {
                    stats.classified += label_missing_intents(&mut records, classifier);
                }
                stats.records += records.len();
                for record in records {
                    index.push(record);
                }
            }
            Err(e) => {
                error!("Failed to load contexts from {}: {:#}", path.display(), e);
                stats.files_failed += 1;
            }
        }
    }

    info!(
        "Loaded {} citation contexts for {} citing papers from {} files in {}",
        index.len(),
        index.citing_count(),
        stats.files,
        format_elapsed(start.elapsed())
    );
    if stats.malformed > 0 {
        warn!("  ({} context lines skipped as malformed)", stats.malformed);
    }
    if stats.classified > 0 {
        info!("  ({} contexts labelled by the intent classifier)", stats.classified);
    }

    Ok((index, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::HeuristicClassifier;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, lines: &[&str]) {
        let mut file = File::create(dir.join(name)).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
    }

    const LINE_A0: &str = r#"{"citingPaperId": "p/A", "citedPaperId": "p/C", "sectionName": "Methods", "citeStart": 0, "citeEnd": 3, "string": "we use [1]", "citationIntent": "Uses"}"#;
    const LINE_A1: &str = r#"{"citingPaperId": "p/A", "citedPaperId": "p/C", "citeStart": 5, "citeEnd": 8, "string": "an overview [1]"}"#;

    #[test]
    fn test_load_in_file_name_order() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "b_i.jsonl", &[LINE_A1]);
        write_file(dir.path(), "a_i.jsonl", &[LINE_A0, "{bad json", ""]);
        write_file(dir.path(), "a.jsonl", &[LINE_A1]);

        let (index, stats) = load_contexts(dir.path(), "_i.jsonl", None).unwrap();
        assert_eq!(stats.files, 2);
        assert_eq!(stats.records, 2);
        assert_eq!(stats.malformed, 1);

        let group = index.contexts_for("p/A", "p/C").unwrap();
        assert_eq!(group.len(), 2);
        assert_eq!(group[0].intent, "Uses");
        assert_eq!(group[0].section, "Methods");
        assert_eq!(group[1].citation_id.as_deref(), Some("p_A>p_C_CIT1"));
        assert_eq!(group[1].intent, "Unknown");
        assert_eq!(group[1].section, "Unknown");
    }

    #[test]
    fn test_classifier_labels_only_missing_intents() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "x_i.jsonl", &[LINE_A0, LINE_A1]);

        let (index, stats) = load_contexts(dir.path(), "_i.jsonl", Some(&HeuristicClassifier)).unwrap();
        assert_eq!(stats.classified, 1);
        let group = index.contexts_for("p/A", "p/C").unwrap();
        assert_eq!(group[0].intent, "Uses");
        assert_eq!(group[1].intent, "Background");
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(load_contexts(&dir.path().join("nope"), "_i.jsonl", None).is_err());
    }
}
