use super::{decode, encode, SledStore, StoreResult};
use crate::stats::StatsSnapshot;

const STATS_TREE: &str = "stats";

impl SledStore {
    pub fn load_stats(&self, lineage: &str) -> StoreResult<Option<StatsSnapshot>> {
        match self.tree(STATS_TREE)?.get(lineage.as_bytes())? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Replace the lineage's statistics document and flush it to disk
    pub fn save_stats(&self, lineage: &str, snapshot: &StatsSnapshot) -> StoreResult<()> {
        self.tree(STATS_TREE)?.insert(lineage.as_bytes(), encode(snapshot)?)?;
        self.flush()
    }

    pub fn clear_stats(&self, lineage: &str) -> StoreResult<()> {
        self.tree(STATS_TREE)?.remove(lineage.as_bytes())?;
        Ok(())
    }
}
