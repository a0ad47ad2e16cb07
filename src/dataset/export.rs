use anyhow::{Context, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

use super::DatasetEntry;

/// Flattened citation edges, one row per cited reference
#[derive(Debug, Default)]
pub struct EdgeColumns {
    citing_keys: Vec<String>,
    citing_dois: Vec<Option<String>>,
    cited_keys: Vec<Option<String>>,
    cited_dois: Vec<Option<String>>,
    context_counts: Vec<u32>,
}

impl EdgeColumns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_entry(&mut self, entry: &DatasetEntry) {
        for reference in &entry.cited_papers {
            self.citing_keys.push(entry.citing_paper.key.clone());
            self.citing_dois.push(entry.citing_paper.doi.clone());
            self.cited_keys.push(reference.canonical_key.clone());
            self.cited_dois.push(reference.doi.clone());
            self.context_counts.push(reference.citation_contexts.len() as u32);
        }
    }

    pub fn len(&self) -> usize {
        self.citing_keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.citing_keys.is_empty()
    }

    pub fn into_frame(self) -> PolarsResult<DataFrame> {
        DataFrame::new(vec![
            Column::new("citing_key".into(), &self.citing_keys),
            Column::new("citing_doi".into(), &self.citing_dois),
            Column::new("cited_key".into(), &self.cited_keys),
            Column::new("cited_doi".into(), &self.cited_dois),
            Column::new("context_count".into(), &self.context_counts),
        ])
    }
}

/// Write the edge table as Zstd-compressed Parquet
pub fn write_edges_parquet(edges: EdgeColumns, path: &Path) -> Result<usize> {
    let mut df = edges.into_frame().context("Failed to build edge table")?;
    let rows = df.height();

    let file = File::create(path).with_context(|| format!("Failed to create output file: {}", path.display()))?;
    ParquetWriter::new(file)
        .with_compression(ParquetCompression::Zstd(None))
        .finish(&mut df)
        .context("Failed to write edge parquet")?;

    Ok(rows)
}
