use super::{decode, encode, SledStore, StoreError, StoreResult};
use crate::corpus::{CanonicalRecord, CorpusIndex, CorpusLookup};
use crate::extract::fold_key;

const RECORDS_TREE: &str = "corpus:records";
const IDS_TREE: &str = "corpus:ids";
const TITLES_TREE: &str = "corpus:titles";
const KEY_NORM_TREE: &str = "corpus:key_norm";

impl SledStore {
    /// Insert or replace a canonical record.
    ///
    /// Lookup entries (identifier URL, title, key_norm) are claimed by the first record
    /// that carries them and never reassigned.
    pub fn upsert_record(&self, record: &CanonicalRecord) -> StoreResult<()> {
        if record.key.trim().is_empty() {
            return Err(StoreError::Validation("canonical record with empty key".to_string()));
        }
        let key = record.key.as_bytes();

        let ids = self.tree(IDS_TREE)?;
        for url in &record.identifier_urls {
            claim(&ids, &fold_key(url), key)?;
        }
        if let Some(title) = &record.title_normalized {
            claim(&self.tree(TITLES_TREE)?, &fold_key(title), key)?;
        }
        claim(&self.tree(KEY_NORM_TREE)?, &fold_key(&record.key_norm), key)?;

        self.tree(RECORDS_TREE)?.insert(key, encode(record)?)?;
        Ok(())
    }

    /// Upsert a record read from a corpus dump.
    ///
    /// An explicit `parsed` value sets the flag. Without one, a record already in the
    /// store keeps its flag, so re-importing a dump does not undo progress.
    pub fn import_record(&self, mut record: CanonicalRecord, parsed: Option<bool>) -> StoreResult<()> {
        record.parsed_flag = match parsed {
            Some(flag) => flag,
            None => self.get_record(&record.key)?.is_some_and(|stored| stored.parsed_flag),
        };
        self.upsert_record(&record)
    }

    pub fn get_record(&self, key: &str) -> StoreResult<Option<CanonicalRecord>> {
        match self.tree(RECORDS_TREE)?.get(key.as_bytes())? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// The canonical record whose `key_norm` matches a citing-paper file name
    pub fn by_key_norm(&self, key_norm: &str) -> StoreResult<Option<CanonicalRecord>> {
        self.lookup(KEY_NORM_TREE, key_norm)
    }

    /// Set the record's `parsed_flag`; the record must exist
    pub fn set_parsed(&self, key: &str, parsed: bool) -> StoreResult<()> {
        let mut record = self
            .get_record(key)?
            .ok_or_else(|| StoreError::NotFound(format!("canonical record {}", key)))?;
        if record.parsed_flag != parsed {
            record.parsed_flag = parsed;
            self.tree(RECORDS_TREE)?.insert(key.as_bytes(), encode(&record)?)?;
        }
        Ok(())
    }

    /// Clear `parsed_flag` on every record. Returns how many records changed.
    pub fn reset_parsed(&self) -> StoreResult<usize> {
        let tree = self.tree(RECORDS_TREE)?;
        let mut changed = 0;
        for item in tree.iter() {
            let (key, bytes) = item?;
            let mut record: CanonicalRecord = decode(&bytes)?;
            if record.parsed_flag {
                record.parsed_flag = false;
                tree.insert(key, encode(&record)?)?;
                changed += 1;
            }
        }
        Ok(changed)
    }

    pub fn corpus_len(&self) -> StoreResult<usize> {
        Ok(self.tree(RECORDS_TREE)?.len())
    }

    /// Copy the whole corpus into memory
    pub fn load_corpus_index(&self) -> StoreResult<CorpusIndex> {
        let tree = self.tree(RECORDS_TREE)?;
        let mut index = CorpusIndex::with_capacity(tree.len());
        for item in tree.iter() {
            let (_, bytes) = item?;
            index.insert(decode(&bytes)?);
        }
        Ok(index)
    }

    fn lookup(&self, tree_name: &str, value: &str) -> StoreResult<Option<CanonicalRecord>> {
        match self.tree(tree_name)?.get(fold_key(value).as_bytes())? {
            Some(key) => self.get_record(&String::from_utf8_lossy(&key)),
            None => Ok(None),
        }
    }
}

/// Point `value` at `key` unless another record already holds it
fn claim(tree: &sled::Tree, value: &str, key: &[u8]) -> StoreResult<()> {
    if value.is_empty() {
        return Ok(());
    }
    // A lost race means another record claimed the value first, which is the rule anyway.
    let _ = tree.compare_and_swap(value.as_bytes(), None as Option<&[u8]>, Some(key))?;
    Ok(())
}

impl CorpusLookup for SledStore {
    fn by_identifier_url(&self, url: &str) -> StoreResult<Option<CanonicalRecord>> {
        self.lookup(IDS_TREE, url)
    }

    fn by_normalized_title(&self, title: &str) -> StoreResult<Option<CanonicalRecord>> {
        self.lookup(TITLES_TREE, title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_records() -> SledStore {
        let store = SledStore::temporary().unwrap();
        store
            .upsert_record(&CanonicalRecord::new(
                "conf/acl/Johnson07",
                Some("Résumé Parsing"),
                ["https://doi.org/10.1/A"],
            ))
            .unwrap();
        store
            .upsert_record(&CanonicalRecord::new("conf/acl/Smith20", Some("Foo Bar"), Vec::<String>::new()))
            .unwrap();
        store
    }

    #[test]
    fn test_lookup_by_identifier_and_title() {
        let store = store_with_records();
        let found = store.by_identifier_url("https://doi.org/10.1/a").unwrap();
        assert_eq!(found.map(|r| r.key), Some("conf/acl/Johnson07".to_string()));

        let found = store.by_normalized_title("RESUMEPARSING").unwrap();
        assert_eq!(found.map(|r| r.key), Some("conf/acl/Johnson07".to_string()));

        assert!(store.by_normalized_title("Missing").unwrap().is_none());
    }

    #[test]
    fn test_by_key_norm() {
        let store = store_with_records();
        let found = store.by_key_norm("conf_acl_Smith20").unwrap().unwrap();
        assert_eq!(found.key, "conf/acl/Smith20");
    }

    #[test]
    fn test_set_and_reset_parsed() {
        let store = store_with_records();
        store.set_parsed("conf/acl/Smith20", true).unwrap();
        assert!(store.get_record("conf/acl/Smith20").unwrap().unwrap().parsed_flag);

        assert_eq!(store.reset_parsed().unwrap(), 1);
        assert!(!store.get_record("conf/acl/Smith20").unwrap().unwrap().parsed_flag);
    }

    #[test]
    fn test_set_parsed_missing_record() {
        let store = store_with_records();
        let err = store.set_parsed("conf/none/X", true).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_empty_key_is_rejected() {
        let store = SledStore::temporary().unwrap();
        let err = store.upsert_record(&CanonicalRecord::new(" ", None, Vec::<String>::new())).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn test_load_corpus_index() {
        let store = store_with_records();
        let index = store.load_corpus_index().unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(store.corpus_len().unwrap(), 2);
    }
}
