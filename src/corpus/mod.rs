pub mod builder;

pub use builder::*;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::extract::{canonical_identifier_url, doi_from_url, fold_key, normalize_title};
use crate::store::StoreResult;

/// One paper of the canonical identifier corpus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    /// Unique corpus key, e.g. `conf/acl/Smith20`
    pub key: String,
    /// Key as it appears in citing-paper file names
    pub key_norm: String,
    /// Alphanumeric-only title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_normalized: Option<String>,
    /// Identifier URLs (DOI, arXiv, publisher pages) in canonical form
    #[serde(default, alias = "doi_urls")]
    pub identifier_urls: Vec<String>,
    #[serde(default)]
    pub parsed_flag: bool,
}

impl CanonicalRecord {
    pub fn new<I, S>(key: &str, title: Option<&str>, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            key: key.to_string(),
            key_norm: key_norm_for_key(key),
            title_normalized: title.and_then(normalize_title),
            identifier_urls: urls
                .into_iter()
                .map(|u| canonical_identifier_url(u.as_ref()))
                .filter(|u| !u.is_empty())
                .collect(),
            parsed_flag: false,
        }
    }

    /// The record's DOI: the first `doi.org` link, without the URL prefix
    pub fn doi(&self) -> Option<String> {
        self.identifier_urls.iter().find_map(|url| doi_from_url(url))
    }
}

/// Default `key_norm` of a corpus key: path separators become underscores
pub fn key_norm_for_key(key: &str) -> String {
    key.replace('/', "_")
}

/// `key_norm` of a citing-paper file: its file name up to the first `.`
pub fn key_norm_for_file(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let stem = name.split('.').next()?;
    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}

/// Read access to the canonical corpus used by the resolver.
///
/// Implementations compare keys after [`fold_key`], so lookups are case- and
/// accent-insensitive. Missing entries are `Ok(None)`, never an error.
pub trait CorpusLookup: Sync {
    /// Exact match on a canonical identifier URL (`https://doi.org/...`, `https://arxiv.org/abs/...`)
    fn by_identifier_url(&self, url: &str) -> StoreResult<Option<CanonicalRecord>>;

    /// Match on an alphanumeric-only normalized title
    fn by_normalized_title(&self, title: &str) -> StoreResult<Option<CanonicalRecord>>;
}

/// In-memory corpus index, for preloaded runs, benchmarks and tests
#[derive(Debug, Clone, Default)]
pub struct CorpusIndex {
    records: HashMap<String, CanonicalRecord>,
    /// folded identifier URL -> key
    ids: HashMap<String, String>,
    /// folded normalized title -> key
    titles: HashMap<String, String>,
    /// folded key_norm -> key
    key_norms: HashMap<String, String>,
}

impl CorpusIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: HashMap::with_capacity(capacity),
            ids: HashMap::with_capacity(capacity),
            titles: HashMap::with_capacity(capacity),
            key_norms: HashMap::with_capacity(capacity),
        }
    }

    /// Add a record. The record itself replaces any earlier one with the same key;
    /// identifier, title and key_norm entries keep the first record that claimed them.
    pub fn insert(&mut self, record: CanonicalRecord) {
        for url in &record.identifier_urls {
            self.ids
                .entry(fold_key(url))
                .or_insert_with(|| record.key.clone());
        }
        if let Some(title) = &record.title_normalized {
            self.titles
                .entry(fold_key(title))
                .or_insert_with(|| record.key.clone());
        }
        self.key_norms
            .entry(fold_key(&record.key_norm))
            .or_insert_with(|| record.key.clone());
        self.records.insert(record.key.clone(), record);
    }

    pub fn get(&self, key: &str) -> Option<&CanonicalRecord> {
        self.records.get(key)
    }

    pub fn by_key_norm(&self, key_norm: &str) -> Option<&CanonicalRecord> {
        self.key_norms
            .get(&fold_key(key_norm))
            .and_then(|key| self.records.get(key))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn title_count(&self) -> usize {
        self.titles.len()
    }

    pub fn identifier_count(&self) -> usize {
        self.ids.len()
    }

    fn lookup(&self, map: &HashMap<String, String>, value: &str) -> Option<CanonicalRecord> {
        map.get(&fold_key(value))
            .and_then(|key| self.records.get(key))
            .cloned()
    }
}

impl CorpusLookup for CorpusIndex {
    fn by_identifier_url(&self, url: &str) -> StoreResult<Option<CanonicalRecord>> {
        Ok(self.lookup(&self.ids, url))
    }

    fn by_normalized_title(&self, title: &str) -> StoreResult<Option<CanonicalRecord>> {
        Ok(self.lookup(&self.titles, title))
    }
}
