use anyhow::{Context, Result};
use log::info;
use std::path::Path;
use std::time::Instant;

use crate::cli::ImportCorpusArgs;
use crate::common::{format_elapsed, setup_logging};
use crate::corpus::{read_corpus_records, CorpusReadStats};
use crate::store::SledStore;

/// Load canonical records into the store, updating records already present
pub fn import_corpus(store: &SledStore, path: &Path) -> Result<CorpusReadStats> {
    let stats = read_corpus_records(path, |entry| {
        let key = entry.record.key.clone();
        store
            .import_record(entry.record, entry.parsed)
            .with_context(|| format!("Failed to store record: {}", key))
    })?;
    store.flush().context("Failed to flush store")?;
    Ok(stats)
}

pub fn run_import_corpus(args: ImportCorpusArgs) -> Result<CorpusReadStats> {
    let start_time = Instant::now();

    setup_logging(&args.log_level)?;

    info!("Starting corpus import");
    info!("Input: {}", args.input);
    info!("Store: {}", args.store.store);

    let store = SledStore::open(&args.store.store)
        .with_context(|| format!("Failed to open store: {}", args.store.store))?;

    let stats = import_corpus(&store, Path::new(&args.input))?;
    let corpus_len = store.corpus_len()?;

    info!("==================== FINAL SUMMARY ====================");
    info!("Total execution time: {}", format_elapsed(start_time.elapsed()));
    info!("Lines processed: {}", stats.lines_processed);
    info!("Records imported: {}", stats.records);
    info!("Lines failed: {}", stats.lines_failed);
    info!("Canonical records in store: {}", corpus_len);
    info!("========================================================");

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_import_gzipped_corpus() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("corpus.jsonl.gz");
        let mut encoder = GzEncoder::new(std::fs::File::create(&path).unwrap(), Compression::default());
        writeln!(encoder, r#"{{"key": "conf/acl/Lee09", "title": "Foo Bar", "ee": "https://doi.org/10.1/LEE"}}"#).unwrap();
        writeln!(encoder, "not json").unwrap();
        writeln!(encoder, r#"{{"key": "conf/acl/Smith20", "ee": ["https://dx.doi.org/10.9/s"]}}"#).unwrap();
        encoder.finish().unwrap();

        let store = SledStore::temporary().unwrap();
        let stats = import_corpus(&store, &path).unwrap();
        assert_eq!(stats.records, 2);
        assert_eq!(stats.lines_failed, 1);

        let lee = store.get_record("conf/acl/Lee09").unwrap().unwrap();
        assert_eq!(lee.doi().as_deref(), Some("10.1/lee"));
        assert_eq!(store.by_key_norm("conf_acl_Smith20").unwrap().unwrap().key, "conf/acl/Smith20");
    }

    #[test]
    fn test_reimport_keeps_parsed_flag() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("corpus.jsonl");
        std::fs::write(
            &path,
            concat!(
                r#"{"key": "conf/acl/Lee09", "title": "Foo Bar"}"#,
                "\n",
                r#"{"key": "conf/acl/Smith20", "title": "Other"}"#,
                "\n",
            ),
        )
        .unwrap();

        let store = SledStore::temporary().unwrap();
        import_corpus(&store, &path).unwrap();
        store.set_parsed("conf/acl/Lee09", true).unwrap();
        store.set_parsed("conf/acl/Smith20", true).unwrap();

        import_corpus(&store, &path).unwrap();
        assert!(store.get_record("conf/acl/Lee09").unwrap().unwrap().parsed_flag);
        assert!(store.get_record("conf/acl/Smith20").unwrap().unwrap().parsed_flag);

        let explicit = dir.path().join("explicit.jsonl");
        std::fs::write(&explicit, "{\"key\": \"conf/acl/Lee09\", \"parsed\": false}\n").unwrap();
        import_corpus(&store, &explicit).unwrap();
        assert!(!store.get_record("conf/acl/Lee09").unwrap().unwrap().parsed_flag);
        assert!(store.get_record("conf/acl/Smith20").unwrap().unwrap().parsed_flag);
    }
}
