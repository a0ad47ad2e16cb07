use log::debug;

use super::{
    decode, decode_index_suffix, encode, encode_index_key, index_prefix, SledStore, StoreError,
    StoreResult,
};
use crate::dataset::DatasetEntry;

/// Result of a unique insert on the citing key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// An entry with the same citing key was already stored and is left untouched
    SkippedExisting,
}

/// One dataset lineage: the entries plus their secondary indexes
#[derive(Clone)]
pub struct SledDataset {
    name: String,
    entries: sled::Tree,
    by_cited_key: sled::Tree,
    by_cited_doi: sled::Tree,
    by_citation_id: sled::Tree,
}

impl SledStore {
    pub fn dataset(&self, name: &str) -> StoreResult<SledDataset> {
        if name.trim().is_empty() {
            return Err(StoreError::Validation("empty dataset name".to_string()));
        }
        let tree = |suffix: &str| self.tree(&format!("dataset:{}:{}", name, suffix));
        Ok(SledDataset {
            name: name.to_string(),
            entries: tree("entries")?,
            by_cited_key: tree("by_cited_key")?,
            by_cited_doi: tree("by_cited_doi")?,
            by_citation_id: tree("by_citation_id")?,
        })
    }
}

impl SledDataset {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert an entry unless its citing key is already present.
    ///
    /// The presence check and the write are one compare-and-swap, so of two concurrent
    /// writers of the same key exactly one inserts. Only that writer updates the indexes.
    pub fn insert(&self, entry: &DatasetEntry) -> StoreResult<InsertOutcome> {
        let citing = entry.citing_paper.key.as_str();
        if citing.trim().is_empty() {
            return Err(StoreError::Validation("dataset entry with empty citing key".to_string()));
        }
        if entry.cited_papers.is_empty() {
            return Err(StoreError::Validation(format!("dataset entry {} has no cited papers", citing)));
        }

        let bytes = encode(entry)?;
        let swapped = self
            .entries
            .compare_and_swap(citing.as_bytes(), None as Option<&[u8]>, Some(bytes))?;
        if swapped.is_err() {
            debug!("Entry {} already present in {}", citing, self.name);
            return Ok(InsertOutcome::SkippedExisting);
        }

        let mut cited_keys = sled::Batch::default();
        let mut cited_dois = sled::Batch::default();
        let mut citation_ids = sled::Batch::default();
        for reference in &entry.cited_papers {
            if let Some(key) = &reference.canonical_key {
                cited_keys.insert(encode_index_key(key, citing), Vec::<u8>::new());
            }
            if let Some(doi) = &reference.doi {
                cited_dois.insert(encode_index_key(doi, citing), Vec::<u8>::new());
            }
            for id in reference.citation_contexts.iter().filter_map(|c| c.citation_id.as_deref()) {
                citation_ids.insert(encode_index_key(id, citing), Vec::<u8>::new());
            }
        }
        self.by_cited_key.apply_batch(cited_keys)?;
        self.by_cited_doi.apply_batch(cited_dois)?;
        self.by_citation_id.apply_batch(citation_ids)?;

        Ok(InsertOutcome::Inserted)
    }

    pub fn contains(&self, citing_key: &str) -> StoreResult<bool> {
        Ok(self.entries.contains_key(citing_key.as_bytes())?)
    }

    pub fn get(&self, citing_key: &str) -> StoreResult<Option<DatasetEntry>> {
        match self.entries.get(citing_key.as_bytes())? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// All entries in citing-key order
    pub fn entries(&self) -> impl Iterator<Item = StoreResult<DatasetEntry>> + '_ {
        self.entries.iter().map(|item| {
            let (_, bytes) = item?;
            decode(&bytes)
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every entry and index of the lineage
    pub fn clear(&self) -> StoreResult<()> {
        self.entries.clear()?;
        self.by_cited_key.clear()?;
        self.by_cited_doi.clear()?;
        self.by_citation_id.clear()?;
        Ok(())
    }

    /// Citing papers that cite the given canonical key
    pub fn citing_keys_for_cited_key(&self, cited_key: &str) -> StoreResult<Vec<String>> {
        scan_index(&self.by_cited_key, cited_key)
    }

    /// Citing papers that cite the given DOI
    pub fn citing_keys_for_cited_doi(&self, cited_doi: &str) -> StoreResult<Vec<String>> {
        scan_index(&self.by_cited_doi, cited_doi)
    }

    /// The citing paper a citation id belongs to
    pub fn citing_key_for_citation_id(&self, citation_id: &str) -> StoreResult<Option<String>> {
        Ok(scan_index(&self.by_citation_id, citation_id)?.into_iter().next())
    }
}

fn scan_index(tree: &sled::Tree, value: &str) -> StoreResult<Vec<String>> {
    let mut citing = Vec::new();
    for item in tree.scan_prefix(index_prefix(value)) {
        let (key, _) = item?;
        if let Some(suffix) = decode_index_suffix(&key) {
            citing.push(suffix);
        }
    }
    Ok(citing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{CitationContext, CitingPaper, ResolvedReference};

    fn entry(citing: &str, cited: &str, with_context: bool) -> DatasetEntry {
        let citation_contexts = if with_context {
            vec![CitationContext {
                citation_id: Some(format!("{}>{}_CIT0", citing, cited)),
                section: "Intro".into(),
                intent: "Background".into(),
                text: Some("as shown by [1]".into()),
                start: Some(12),
                end: Some(15),
            }]
        } else {
            vec![]
        };
        DatasetEntry {
            citing_paper: CitingPaper { key: citing.into(), doi: None },
            cited_papers: vec![ResolvedReference {
                canonical_key: Some(cited.into()),
                doi: Some("10.1/a".into()),
                raw_text: "ref".into(),
                citation_contexts,
            }],
        }
    }

    #[test]
    fn test_insert_is_unique_on_citing_key() {
        let store = SledStore::temporary().unwrap();
        let dataset = store.dataset("citations").unwrap();

        let first = entry("conf/a/One", "conf/b/Two", false);
        assert_eq!(dataset.insert(&first).unwrap(), InsertOutcome::Inserted);

        let mut second = entry("conf/a/One", "conf/c/Three", false);
        second.cited_papers[0].raw_text = "changed".into();
        assert_eq!(dataset.insert(&second).unwrap(), InsertOutcome::SkippedExisting);

        assert_eq!(dataset.get("conf/a/One").unwrap(), Some(first));
        assert_eq!(dataset.len(), 1);
        assert!(dataset.citing_keys_for_cited_key("conf/c/Three").unwrap().is_empty());
    }

    #[test]
    fn test_secondary_indexes() {
        let store = SledStore::temporary().unwrap();
        let dataset = store.dataset("citations").unwrap();
        dataset.insert(&entry("p/A", "p/C", true)).unwrap();
        dataset.insert(&entry("p/B", "p/C", false)).unwrap();

        assert_eq!(dataset.citing_keys_for_cited_key("p/C").unwrap(), vec!["p/A", "p/B"]);
        assert_eq!(dataset.citing_keys_for_cited_doi("10.1/a").unwrap(), vec!["p/A", "p/B"]);
        assert_eq!(
            dataset.citing_key_for_citation_id("p/A>p/C_CIT0").unwrap().as_deref(),
            Some("p/A")
        );
        assert_eq!(dataset.citing_key_for_citation_id("p/B>p/C_CIT0").unwrap(), None);
    }

    #[test]
    fn test_rejects_invalid_entries() {
        let store = SledStore::temporary().unwrap();
        let dataset = store.dataset("citations").unwrap();
        let mut empty = entry("p/A", "p/C", false);
        empty.cited_papers.clear();
        assert!(matches!(dataset.insert(&empty), Err(StoreError::Validation(_))));
        assert!(matches!(store.dataset(""), Err(StoreError::Validation(_))));
    }

    #[test]
    fn test_lineages_are_isolated_and_clearable() {
        let store = SledStore::temporary().unwrap();
        let one = store.dataset("one").unwrap();
        let two = store.dataset("two").unwrap();
        one.insert(&entry("p/A", "p/C", true)).unwrap();

        assert!(one.contains("p/A").unwrap());
        assert!(!two.contains("p/A").unwrap());

        one.clear().unwrap();
        assert!(one.is_empty());
        assert!(one.citing_keys_for_cited_key("p/C").unwrap().is_empty());
        assert_eq!(one.entries().count(), 0);
    }
}
