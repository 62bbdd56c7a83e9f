//! Memory Retrieval: query model and relevance ranking.
//!
//! Search is two-stage: the [`RecordStore`](crate::store::RecordStore)
//! narrows candidates with its cheap filters (time range, context,
//! significance floor, limit), then the [`RelevanceEngine`] scores each
//! candidate and explains why it matched.

pub mod scoring;

use chrono::{DateTime, Utc};

use crate::config::SearchConfig;
use crate::record::EpisodicRecord;
use crate::store::StoreFilter;
use crate::types::{EmotionTarget, TimeRange};

/// A search request. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryQuery {
    /// Only records inside this range; also enables the recency bonus.
    pub time_range: Option<TimeRange>,
    /// Participants of interest. Only affects match reasons.
    pub participants: Option<Vec<String>>,
    /// Only records with exactly this context. An empty string means no
    /// context filter.
    pub context: Option<String>,
    /// Partial emotional target used for similarity.
    pub emotions: Option<EmotionTarget>,
    /// Minimum significance.
    pub significance_floor: Option<f64>,
    /// Maximum number of results.
    pub limit: Option<usize>,
}

impl MemoryQuery {
    /// Empty query: matches everything, default limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to a time range.
    #[must_use]
    pub fn time_range(mut self, range: TimeRange) -> Self {
        self.time_range = Some(range);
        self
    }

    /// Set the participants of interest.
    #[must_use]
    pub fn participants<I, S>(mut self, participants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.participants = Some(participants.into_iter().map(Into::into).collect());
        self
    }

    /// Restrict to one context.
    #[must_use]
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Set the emotional target.
    #[must_use]
    pub fn emotions(mut self, target: EmotionTarget) -> Self {
        self.emotions = Some(target);
        self
    }

    /// Set the significance floor.
    #[must_use]
    pub fn significance_floor(mut self, floor: f64) -> Self {
        self.significance_floor = Some(floor);
        self
    }

    /// Cap the number of results.
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// The store-side part of this query.
    #[must_use]
    pub fn to_filter(&self, default_limit: usize) -> StoreFilter {
        StoreFilter {
            time_range: self.time_range,
            context: self.context.clone().filter(|c| !c.is_empty()),
            significance_floor: self.significance_floor,
            limit: Some(self.limit.unwrap_or(default_limit)),
        }
    }
}

/// A scored search result. Computed per query, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// The matched record.
    pub record: EpisodicRecord,
    /// Relevance in [0, 1].
    pub relevance_score: f64,
    /// Why the record matched, in fixed order.
    pub match_reasons: Vec<String>,
}

/// Scores and ranks store results against a query.
#[derive(Debug, Clone, Default)]
pub struct RelevanceEngine {
    config: SearchConfig,
}

impl RelevanceEngine {
    /// Create a new engine with the given configuration.
    #[must_use]
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Score a single record.
    #[must_use]
    pub fn evaluate(&self, record: EpisodicRecord, query: &MemoryQuery, now: DateTime<Utc>) -> SearchResult {
        let relevance_score = scoring::relevance_score(&record, query, now, &self.config);
        let match_reasons = scoring::match_reasons(&record, query);
        SearchResult {
            record,
            relevance_score,
            match_reasons,
        }
    }

    /// Score every record and sort by relevance, highest first.
    ///
    /// The sort is stable, so ties keep the order the store returned.
    #[must_use]
    pub fn rank(
        &self,
        records: Vec<EpisodicRecord>,
        query: &MemoryQuery,
        now: DateTime<Utc>,
    ) -> Vec<SearchResult> {
        let mut results: Vec<SearchResult> = records
            .into_iter()
            .map(|record| self.evaluate(record, query, now))
            .collect();

        results.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results
    }
}
