//! In-process record store.

use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;

use crate::error::Result;
use crate::record::EpisodicRecord;
use crate::store::{default_ranking, RecordStore, StoreFilter, StoreStats};
use crate::types::RecordId;

/// Record store backed by a `HashMap` behind a read/write lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<RecordId, EpisodicRecord>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delete a record. Returns `true` if it existed.
    pub fn remove(&self, id: RecordId) -> bool {
        self.records.write().remove(&id).is_some()
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl RecordStore for MemoryStore {
    fn put(&self, record: &EpisodicRecord) -> Result<()> {
        self.records.write().insert(record.id, record.clone());
        Ok(())
    }

    fn get(&self, id: RecordId) -> Result<Option<EpisodicRecord>> {
        Ok(self.records.read().get(&id).cloned())
    }

    fn query(&self, filter: &StoreFilter) -> Result<Vec<EpisodicRecord>> {
        let mut hits: Vec<EpisodicRecord> = self
            .records
            .read()
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        hits.sort_by(default_ranking);
        hits.truncate(filter.limit());
        Ok(hits)
    }

    fn aggregate_stats(&self) -> Result<StoreStats> {
        let records = self.records.read();
        let mut group_counts: BTreeMap<String, u64> = BTreeMap::new();
        let mut total = 0.0;
        for record in records.values() {
            *group_counts.entry(record.context.clone()).or_default() += 1;
            total += record.significance;
        }

        #[allow(clippy::cast_precision_loss)]
        let avg_significance = if records.is_empty() {
            0.0
        } else {
            total / records.len() as f64
        };

        Ok(StoreStats {
            count: records.len() as u64,
            group_counts,
            avg_significance,
        })
    }
}
