//! Sled-backed persistence for the corpus, the dataset lineages and their statistics.
//!
//! Trees:
//! - `corpus:records`: corpus key → CanonicalRecord JSON
//! - `corpus:ids`, `corpus:titles`, `corpus:key_norm`: folded lookup value → corpus key
//! - `dataset:<lineage>:entries`: citing key → DatasetEntry JSON
//! - `dataset:<lineage>:by_*`: secondary indexes keyed `value\0citing key`
//! - `stats`: lineage → StatsSnapshot JSON

pub mod corpus;
pub mod dataset;
pub mod stats;

pub use dataset::{InsertOutcome, SledDataset};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

/// Store failures, split by how the caller should react
#[derive(Debug, Error)]
pub enum StoreError {
    /// A document the caller required does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// A document violates a constraint or cannot be decoded
    #[error("validation failed: {0}")]
    Validation(String),

    /// The backing store is unavailable
    #[error("store unavailable: {0}")]
    Connectivity(#[from] sled::Error),
}

impl StoreError {
    /// Only connectivity failures abort a run
    pub fn is_fatal(&self) -> bool {
        matches!(self, StoreError::Connectivity(_))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Handle to the on-disk database. Cloning is cheap and shares the same database.
#[derive(Clone)]
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// A database removed when the last handle drops
    pub fn temporary() -> StoreResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    pub(crate) fn tree(&self, name: &str) -> StoreResult<sled::Tree> {
        Ok(self.db.open_tree(name)?)
    }

    pub fn flush(&self) -> StoreResult<()> {
        self.db.flush()?;
        Ok(())
    }
}

pub(crate) fn encode<T: Serialize>(value: &T) -> StoreResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| StoreError::Validation(format!("encode failed: {}", e)))
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> StoreResult<T> {
    serde_json::from_slice(bytes).map_err(|e| StoreError::Validation(format!("decode failed: {}", e)))
}

/// Composite index key: `value\0suffix`
pub(crate) fn encode_index_key(value: &str, suffix: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(value.len() + suffix.len() + 1);
    key.extend_from_slice(value.as_bytes());
    key.push(0);
    key.extend_from_slice(suffix.as_bytes());
    key
}

/// Prefix matching every composite key of `value`
pub(crate) fn index_prefix(value: &str) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(value.len() + 1);
    prefix.extend_from_slice(value.as_bytes());
    prefix.push(0);
    prefix
}

pub(crate) fn decode_index_suffix(key: &[u8]) -> Option<String> {
    let pos = key.iter().position(|&b| b == 0)?;
    Some(String::from_utf8_lossy(&key[pos + 1..]).to_string())
}
