//! Record storage: the persistence boundary of the memory system.
//!
//! The scoring and consolidation code only ever talks to a [`RecordStore`].
//! Two backends ship with the crate:
//!
//! - [`SqliteStore`]: durable, one row per record.
//! - [`MemoryStore`]: in-process map, handy for tests and short-lived agents.
//!
//! Both order query results the same way: significance descending, then
//! timestamp descending.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::cmp::Ordering;
use std::collections::BTreeMap;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::record::EpisodicRecord;
use crate::types::{RecordId, TimeRange};

/// Limit applied when a filter does not set one.
pub const DEFAULT_QUERY_LIMIT: usize = 50;

/// Persistence operations the core relies on.
pub trait RecordStore: Send + Sync {
    /// Insert or replace a record, keyed by its id.
    ///
    /// # Errors
    /// Returns an error if the backend cannot write the record.
    fn put(&self, record: &EpisodicRecord) -> Result<()>;

    /// Fetch a record by id. A missing record is `Ok(None)`.
    ///
    /// # Errors
    /// Returns an error if the backend cannot be read.
    fn get(&self, id: RecordId) -> Result<Option<EpisodicRecord>>;

    /// Records matching `filter`, ranked by significance then recency.
    ///
    /// # Errors
    /// Returns an error if the backend cannot be read.
    fn query(&self, filter: &StoreFilter) -> Result<Vec<EpisodicRecord>>;

    /// Count, per-context counts and mean significance over all records.
    ///
    /// # Errors
    /// Returns an error if the backend cannot be read.
    fn aggregate_stats(&self) -> Result<StoreStats>;
}

/// Filter passed to [`RecordStore::query`]. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreFilter {
    /// Only records whose timestamp falls in this inclusive range.
    pub time_range: Option<TimeRange>,
    /// Only records with exactly this context.
    pub context: Option<String>,
    /// Only records with `significance >= floor`.
    pub significance_floor: Option<f64>,
    /// Maximum number of records returned (default 50).
    pub limit: Option<usize>,
}

impl StoreFilter {
    /// Effective result limit.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_QUERY_LIMIT)
    }

    /// Whether `record` passes every set criterion.
    #[must_use]
    pub fn matches(&self, record: &EpisodicRecord) -> bool {
        self.time_range
            .is_none_or(|range| range.contains(&record.timestamp))
            && self
                .context
                .as_deref()
                .is_none_or(|ctx| record.context == ctx)
            && self
                .significance_floor
                .is_none_or(|floor| record.significance >= floor)
    }
}

/// Aggregate statistics over every stored record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreStats {
    /// Number of stored records.
    pub count: u64,
    /// Number of records per context.
    pub group_counts: BTreeMap<String, u64>,
    /// Mean significance (0 when the store is empty).
    pub avg_significance: f64,
}

/// Default store ranking: significance descending, then newest first.
#[must_use]
pub fn default_ranking(a: &EpisodicRecord, b: &EpisodicRecord) -> Ordering {
    OrderedFloat(b.significance)
        .cmp(&OrderedFloat(a.significance))
        .then_with(|| b.timestamp.cmp(&a.timestamp))
}
