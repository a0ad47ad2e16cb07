use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use log::info;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use super::CanonicalRecord;
use crate::common::format_elapsed;

/// A single value or a list of values, as corpus dumps record `ee`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

/// One line of a corpus dump
#[derive(Debug, Deserialize)]
struct CorpusLine {
    key: String,
    #[serde(default)]
    key_norm: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    ee: Option<OneOrMany>,
    #[serde(default)]
    parsed: Option<bool>,
}

/// A canonical record read from a corpus dump
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusEntry {
    pub record: CanonicalRecord,
    /// The dump's `parsed` value; `None` when the line does not carry one
    pub parsed: Option<bool>,
}

impl From<CorpusLine> for CorpusEntry {
    fn from(line: CorpusLine) -> Self {
        let urls = line.ee.map(OneOrMany::into_vec).unwrap_or_default();
        let mut record = CanonicalRecord::new(&line.key, line.title.as_deref(), urls);
        if let Some(key_norm) = line.key_norm.filter(|k| !k.trim().is_empty()) {
            record.key_norm = key_norm;
        }
        CorpusEntry { record, parsed: line.parsed }
    }
}

/// Counters of one corpus read
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CorpusReadStats {
    pub lines_processed: usize,
    pub records: usize,
    pub lines_failed: usize,
}

/// Open a JSONL file, decompressing when the path ends in `.gz`
pub fn open_jsonl(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Stream corpus entries from a dump into `sink`.
///
/// Malformed lines are counted and skipped. Errors returned by `sink` abort the read.
pub fn read_corpus_records<F>(path: &Path, mut sink: F) -> Result<CorpusReadStats>
where
    F: FnMut(CorpusEntry) -> Result<()>,
{
    info!("Reading corpus records from: {}", path.display());
    let start = Instant::now();

    let reader = open_jsonl(path)?;
    let mut stats = CorpusReadStats::default();

    for line_result in reader.lines() {
        let line = line_result.context("Failed to read line")?;
        if line.trim().is_empty() {
            continue;
        }
        stats.lines_processed += 1;

        match serde_json::from_str::<CorpusLine>(&line) {
            Ok(parsed) if !parsed.key.trim().is_empty() => {
                sink(parsed.into())?;
                stats.records += 1;
            }
            _ => stats.lines_failed += 1,
        }

        if stats.lines_processed % 500_000 == 0 {
            info!("  Processed {} lines, {} records...", stats.lines_processed, stats.records);
        }
    }

    info!(
        "Read {} records from {} lines in {}",
        stats.records,
        stats.lines_processed,
        format_elapsed(start.elapsed())
    );
    if stats.lines_failed > 0 {
        info!("  ({} lines failed to parse)", stats.lines_failed);
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{CorpusIndex, CorpusLookup};
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_jsonl_gz(records: &[&str]) -> NamedTempFile {
        let file = tempfile::Builder::new().suffix(".jsonl.gz").tempfile().unwrap();
        let encoder = GzEncoder::new(file.reopen().unwrap(), Compression::default());
        let mut writer = std::io::BufWriter::new(encoder);

        for record in records {
            writeln!(writer, "{}", record).unwrap();
        }
        writer.into_inner().unwrap().finish().unwrap();

        file
    }

    fn index_from(path: &Path) -> CorpusIndex {
        let mut index = CorpusIndex::new();
        read_corpus_records(path, |entry| {
            let mut record = entry.record;
            record.parsed_flag = entry.parsed.unwrap_or(false);
            index.insert(record);
            Ok(())
        })
        .unwrap();
        index
    }

    #[test]
    fn test_index_from_jsonl_gz() {
        let file = create_test_jsonl_gz(&[
            r#"{"key": "conf/acl/Johnson07", "title": "Example Study.", "ee": "https://doi.org/10.1/a"}"#,
            r#"{"key": "conf/acl/Lee09", "title": "Foo Bar", "ee": ["https://example.org/x", "https://arxiv.org/abs/0901.0001"]}"#,
            r#"not json"#,
            r#"{"title": "no key"}"#,
        ]);

        let index = index_from(file.path());

        assert_eq!(index.len(), 2);
        assert_eq!(index.identifier_count(), 3);
        let found = index.by_identifier_url("https://arxiv.org/abs/0901.0001").unwrap();
        assert_eq!(found.map(|r| r.key), Some("conf/acl/Lee09".to_string()));
    }

    #[test]
    fn test_read_counts_failures() {
        let file = create_test_jsonl_gz(&[r#"{"key": "a/b"}"#, "{broken", ""]);
        let mut keys = Vec::new();
        let stats = read_corpus_records(file.path(), |entry| {
            keys.push(entry.record.key_norm);
            Ok(())
        })
        .unwrap();

        assert_eq!(stats, CorpusReadStats { lines_processed: 2, records: 1, lines_failed: 1 });
        assert_eq!(keys, vec!["a_b"]);
    }

    #[test]
    fn test_plain_jsonl_with_explicit_key_norm() {
        let mut file = tempfile::Builder::new().suffix(".jsonl").tempfile().unwrap();
        writeln!(file, r#"{{"key": "conf/x/Y", "key_norm": "custom_name", "parsed": true}}"#).unwrap();
        file.flush().unwrap();

        let index = index_from(file.path());
        let record = index.by_key_norm("custom_name").unwrap();
        assert_eq!(record.key, "conf/x/Y");
        assert!(record.parsed_flag);
    }

    #[test]
    fn test_parsed_field_absent_or_explicit() {
        let mut file = tempfile::Builder::new().suffix(".jsonl").tempfile().unwrap();
        writeln!(file, r#"{{"key": "a/none"}}"#).unwrap();
        writeln!(file, r#"{{"key": "a/no", "parsed": false}}"#).unwrap();
        writeln!(file, r#"{{"key": "a/yes", "parsed": true}}"#).unwrap();
        file.flush().unwrap();

        let mut flags = Vec::new();
        read_corpus_records(file.path(), |entry| {
            flags.push((entry.record.key.clone(), entry.parsed));
            Ok(())
        })
        .unwrap();

        assert_eq!(
            flags,
            vec![
                ("a/none".to_string(), None),
                ("a/no".to_string(), Some(false)),
                ("a/yes".to_string(), Some(true)),
            ]
        );
    }
}
