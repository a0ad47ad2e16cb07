use anyhow::{Context, Result};
use crossbeam_channel::{bounded, Sender};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

/// Paths for an export (full entries, edge table)
#[derive(Debug, Clone)]
pub struct ExportPaths {
    pub entries: PathBuf,
    pub edges: PathBuf,
}

impl ExportPaths {
    /// Generate export paths from a base path
    /// "dataset.jsonl" -> "dataset.jsonl", "dataset_edges.parquet"
    pub fn from_base<P: AsRef<Path>>(base: P) -> Self {
        let base = base.as_ref();
        let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or("dataset");
        let parent = base.parent();

        let make_path = |filename: String| -> PathBuf {
            match parent {
                Some(p) if !p.as_os_str().is_empty() => p.join(filename),
                _ => PathBuf::from(filename),
            }
        };

        let entries = match base.extension().and_then(|s| s.to_str()) {
            Some(_) => base.to_path_buf(),
            None => make_path(format!("{}.jsonl", stem)),
        };

        Self {
            entries,
            edges: make_path(format!("{}_edges.parquet", stem)),
        }
    }
}

/// A JSONL file fed through a bounded channel by any number of producers
pub struct JsonlWriter {
    sender: Sender<String>,
    handle: JoinHandle<Result<usize>>,
}

impl JsonlWriter {
    /// Create `path` and start the writer thread
    pub fn spawn(path: &Path, capacity: usize) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        let (sender, receiver) = bounded::<String>(capacity.max(1));
        let display = path.display().to_string();

        let handle = thread::spawn(move || -> Result<usize> {
            let mut writer = BufWriter::new(file);
            let mut count = 0;
            for line in receiver {
                writeln!(writer, "{}", line)
                    .with_context(|| format!("Failed to write to output file: {}", display))?;
                count += 1;

                if count % 10000 == 0 {
                    writer.flush()?;
                }
            }
            writer.flush()?;
            Ok(count)
        });

        Ok(Self { sender, handle })
    }

    /// Queue one line. The writer is `Sync`, so producer threads can share a reference.
    pub fn send(&self, line: String) -> Result<()> {
        self.sender
            .send(line)
            .map_err(|_| anyhow::anyhow!("JSONL writer thread stopped"))
    }

    /// Close the channel and wait for the writer. Returns the number of lines written.
    pub fn finish(self) -> Result<usize> {
        drop(self.sender);
        self.handle
            .join()
            .map_err(|_| anyhow::anyhow!("JSONL writer thread panicked"))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_path_generation() {
        let paths = ExportPaths::from_base("dataset.jsonl");
        assert_eq!(paths.entries, PathBuf::from("dataset.jsonl"));
        assert_eq!(paths.edges, PathBuf::from("dataset_edges.parquet"));
    }

    #[test]
    fn test_export_path_with_directory() {
        let paths = ExportPaths::from_base("/path/to/citations.jsonl");
        assert_eq!(paths.entries, PathBuf::from("/path/to/citations.jsonl"));
        assert_eq!(paths.edges, PathBuf::from("/path/to/citations_edges.parquet"));
    }

    #[test]
    fn test_export_path_no_extension() {
        let paths = ExportPaths::from_base("out/citations");
        assert_eq!(paths.entries, PathBuf::from("out/citations.jsonl"));
        assert_eq!(paths.edges, PathBuf::from("out/citations_edges.parquet"));
    }

    #[test]
    fn test_jsonl_writer_collects_all_producers() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.jsonl");
        let writer = JsonlWriter::spawn(&path, 2).unwrap();

        thread::scope(|scope| {
            for i in 0..3 {
                let writer = &writer;
                scope.spawn(move || writer.send(format!("{{\"n\": {}}}", i)).unwrap());
            }
        });
        writer.send("{\"n\": 3}".to_string()).unwrap();

        assert_eq!(writer.finish().unwrap(), 4);
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.lines().count(), 4);
    }
}
