//! The memory manager: what callers talk to.
//!
//! Write path: score → store → schedule consolidation → return id.
//! Read path: store query → relevance ranking.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, instrument};

use crate::config::RecollectConfig;
use crate::error::Result;
use crate::record::EpisodicRecord;
use crate::retrieval::{MemoryQuery, RelevanceEngine, SearchResult};
use crate::store::{RecordStore, SqliteStore, StoreStats};
use crate::types::{EmotionalState, RecordId};
use crate::worker::{ConsolidationQueue, QueueStats};

/// Records interactions, searches them, and keeps the link graph up to date.
///
/// # Usage
///
/// ```no_run
/// # use recollect_core::{MemoryManager, MemoryQuery, RecollectConfig};
/// # use recollect_core::types::EmotionalState;
/// # async fn demo() -> recollect_core::error::Result<()> {
/// let manager = MemoryManager::open(RecollectConfig::default())?;
/// let id = manager.record_interaction(
///     vec!["logan".into(), "aton".into()],
///     "work",
///     vec!["Created implementation plan".into()],
///     EmotionalState::new(0.7, 0.5, 0.6),
///     "Designed the system",
/// )?;
/// let hits = manager.search(&MemoryQuery::new().context("work"))?;
/// manager.close().await;
/// # Ok(())
/// # }
/// ```
pub struct MemoryManager {
    store: Arc<dyn RecordStore>,
    relevance: RelevanceEngine,
    consolidation: ConsolidationQueue,
    default_limit: usize,
}

impl std::fmt::Debug for MemoryManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryManager")
            .field("relevance", &self.relevance)
            .field("consolidation", &self.consolidation)
            .field("default_limit", &self.default_limit)
            .finish_non_exhaustive()
    }
}

impl MemoryManager {
    /// Build a manager over any store.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime (the consolidation worker is
    /// spawned here).
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, config: RecollectConfig) -> Self {
        let consolidation = ConsolidationQueue::spawn(Arc::clone(&store), config.consolidation);
        Self {
            store,
            relevance: RelevanceEngine::new(config.search.clone()),
            consolidation,
            default_limit: config.search.default_limit,
        }
    }

    /// Open the SQLite store named in `config.store` and build a manager over it.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn open(config: RecollectConfig) -> Result<Self> {
        let store = SqliteStore::open(&config.store)?;
        Ok(Self::new(Arc::new(store), config))
    }

    /// Store a new interaction and schedule its consolidation.
    ///
    /// Significance is computed here, once. The returned id is valid as soon
    /// as this returns; links appear later.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the write.
    #[instrument(skip_all, fields(context = tracing::field::Empty))]
    pub fn record_interaction(
        &self,
        participants: Vec<String>,
        context: impl Into<String>,
        events: Vec<String>,
        emotions: EmotionalState,
        outcome: impl Into<String>,
    ) -> Result<RecordId> {
        let record = EpisodicRecord::new(participants, context, events, emotions, outcome);
        tracing::Span::current().record("context", record.context.as_str());

        self.store.put(&record)?;
        self.consolidation.schedule(record.id);

        debug!(
            id = %record.id,
            significance = record.significance,
            "Interaction recorded"
        );
        Ok(record.id)
    }

    /// Fetch one record by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn get(&self, id: RecordId) -> Result<Option<EpisodicRecord>> {
        self.store.get(id)
    }

    /// Search records, ranked by relevance (highest first).
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn search(&self, query: &MemoryQuery) -> Result<Vec<SearchResult>> {
        let records = self.store.query(&query.to_filter(self.default_limit))?;
        let results = self.relevance.rank(records, query, Utc::now());
        debug!(results = results.len(), "Search complete");
        Ok(results)
    }

    /// Aggregate statistics from the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn stats(&self) -> Result<StoreStats> {
        self.store.aggregate_stats()
    }

    /// Consolidation queue counters.
    #[must_use]
    pub fn queue_stats(&self) -> QueueStats {
        self.consolidation.stats()
    }

    /// Run all pending consolidation passes now and wait for them.
    pub async fn flush(&self) {
        self.consolidation.flush().await;
    }

    /// Finish pending consolidation and stop the worker.
    pub async fn close(self) {
        self.consolidation.shutdown().await;
    }
}
