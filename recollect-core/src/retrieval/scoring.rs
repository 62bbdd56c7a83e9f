//! Per-factor relevance scoring for search results.
//!
//! Relevance = Significance + Recency + Emotional, capped at 1.0
//!
//! Where:
//!   Significance = the record's stored significance
//!   Recency      = max(0, (W − |now − t| in days) / W) × w_recency   (only with a time range)
//!   Emotional    = similarity(record.emotions, target) × w_emotional  (only with a target)
//!
//! W defaults to 30 days, `w_recency` to 0.2 and `w_emotional` to 0.3.

use chrono::{DateTime, Utc};

use crate::config::SearchConfig;
use crate::record::EpisodicRecord;
use crate::retrieval::MemoryQuery;
use crate::types::{EmotionTarget, EmotionalState};

const MILLIS_PER_DAY: f64 = 86_400_000.0;
const VALENCE_RANGE: f64 = 2.0;
const UNIT_RANGE: f64 = 1.0;

/// Breakdown of a relevance score into its component factors.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RelevanceBreakdown {
    /// Base significance.
    pub significance: f64,
    /// Recency bonus.
    pub recency: f64,
    /// Weighted emotional similarity.
    pub emotional: f64,
}

impl RelevanceBreakdown {
    /// Sum of all factors, clamped to [0, 1].
    #[must_use]
    pub fn total(&self) -> f64 {
        (self.significance + self.recency + self.emotional).clamp(0.0, 1.0)
    }
}

/// Compute every relevance factor for one record.
#[must_use]
pub fn compute_breakdown(
    record: &EpisodicRecord,
    query: &MemoryQuery,
    now: DateTime<Utc>,
    config: &SearchConfig,
) -> RelevanceBreakdown {
    let recency = if query.time_range.is_some() {
        recency_bonus(&record.timestamp, now, config)
    } else {
        0.0
    };
    let emotional = query.emotions.as_ref().map_or(0.0, |target| {
        emotional_similarity(&record.emotions, target) * config.emotional_weight
    });

    RelevanceBreakdown {
        significance: record.significance,
        recency,
        emotional,
    }
}

/// Relevance score in [0, 1].
#[must_use]
pub fn relevance_score(
    record: &EpisodicRecord,
    query: &MemoryQuery,
    now: DateTime<Utc>,
    config: &SearchConfig,
) -> f64 {
    compute_breakdown(record, query, now, config).total()
}

/// Linear recency bonus: full weight at `now`, zero at the window edge.
///
/// Uses the absolute distance, so future timestamps earn the same bonus as
/// past ones.
#[must_use]
pub fn recency_bonus(timestamp: &DateTime<Utc>, now: DateTime<Utc>, config: &SearchConfig) -> f64 {
    if config.recency_window_days <= 0.0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let days = (now - *timestamp).num_milliseconds().unsigned_abs() as f64 / MILLIS_PER_DAY;
    ((config.recency_window_days - days) / config.recency_window_days * config.recency_weight)
        .max(0.0)
}

/// Mean per-dimension closeness between a state and a partial target.
///
/// Each specified dimension contributes `1 − |a − b| / range`. Returns 0 when
/// the target specifies nothing.
#[must_use]
pub fn emotional_similarity(state: &EmotionalState, target: &EmotionTarget) -> f64 {
    let dims = [
        (state.valence, target.valence, VALENCE_RANGE),
        (state.arousal, target.arousal, UNIT_RANGE),
        (state.dominance, target.dominance, UNIT_RANGE),
    ];

    let (sum, n) = dims
        .iter()
        .filter_map(|&(have, want, range)| {
            want.map(|w| 1.0 - (f64::from(have) - f64::from(w)).abs() / range)
        })
        .fold((0.0, 0_u32), |(sum, n), s| (sum + s, n + 1));

    if n == 0 { 0.0 } else { sum / f64::from(n) }
}

/// Human-readable reasons a record matched the query, in fixed order.
#[must_use]
pub fn match_reasons(record: &EpisodicRecord, query: &MemoryQuery) -> Vec<String> {
    let mut reasons = Vec::new();

    if let Some(context) = query.context.as_deref().filter(|c| !c.is_empty()) {
        if record.context == context {
            reasons.push(format!("context match: {context}"));
        }
    }

    if let Some(wanted) = &query.participants {
        let shared: Vec<&str> = record
            .participants
            .iter()
            .filter(|p| wanted.contains(*p))
            .map(String::as_str)
            .collect();
        if !shared.is_empty() {
            reasons.push(format!("shared participants: {}", shared.join(", ")));
        }
    }

    if record.significance >= query.significance_floor.unwrap_or(0.0) {
        reasons.push(format!("high significance: {:.2}", record.significance));
    }

    reasons
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TimeRange;
    use chrono::Duration;

    fn record_at(ts: DateTime<Utc>) -> EpisodicRecord {
        EpisodicRecord::at(
            ts,
            vec!["logan".into(), "aton".into(), "logan".into()],
            "work",
            vec!["Planned the release".into()],
            EmotionalState::new(0.5, 0.5, 0.5),
            "Shipped",
        )
    }

    fn with_range() -> MemoryQuery {
        let now = Utc::now();
        MemoryQuery::new().time_range(TimeRange::around(now, Duration::days(365)))
    }

    #[test]
    fn recency_decays_linearly_over_window() {
        let cfg = SearchConfig::default();
        let now = Utc::now();
        let fresh = recency_bonus(&now, now, &cfg);
        let half = recency_bonus(&(now - Duration::days(15)), now, &cfg);
        let stale = recency_bonus(&(now - Duration::days(45)), now, &cfg);

        assert!((fresh - 0.2).abs() < 1e-9);
        assert!((half - 0.1).abs() < 1e-6);
        assert!(stale.abs() < f64::EPSILON);
    }

    #[test]
    fn recency_treats_future_like_past() {
        let cfg = SearchConfig::default();
        let now = Utc::now();
        let past = recency_bonus(&(now - Duration::days(10)), now, &cfg);
        let future = recency_bonus(&(now + Duration::days(10)), now, &cfg);
        assert!((past - future).abs() < 1e-9);
    }

    #[test]
    fn recency_only_applies_with_time_range() {
        let cfg = SearchConfig::default();
        let now = Utc::now();
        let rec = record_at(now);

        let without = compute_breakdown(&rec, &MemoryQuery::new(), now, &cfg);
        let with = compute_breakdown(&rec, &with_range(), now, &cfg);
        assert!(without.recency.abs() < f64::EPSILON);
        assert!(with.recency > 0.19);
    }

    #[test]
    fn empty_target_similarity_is_zero() {
        let state = EmotionalState::new(0.3, 0.3, 0.3);
        assert!(emotional_similarity(&state, &EmotionTarget::EMPTY).abs() < f64::EPSILON);
    }

    #[test]
    fn similarity_averages_specified_dimensions() {
        let state = EmotionalState::new(1.0, 0.5, 0.0);
        // valence: 1 - 2/2 = 0; arousal: 1 - 0 = 1
        let target = EmotionTarget::default().valence(-1.0).arousal(0.5);
        assert!((emotional_similarity(&state, &target) - 0.5).abs() < 1e-6);

        let exact = EmotionTarget::default().valence(1.0).arousal(0.5).dominance(0.0);
        assert!((emotional_similarity(&state, &exact) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn score_is_capped() {
        let cfg = SearchConfig::default();
        let now = Utc::now();
        let mut rec = record_at(now);
        rec.significance = 0.95;
        let query = with_range().emotions(EmotionTarget::default().valence(0.5));
        assert!((relevance_score(&rec, &query, now, &cfg) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn out_of_range_target_never_goes_negative() {
        let cfg = SearchConfig::default();
        let now = Utc::now();
        let mut rec = record_at(now);
        rec.significance = 0.0;
        let query = MemoryQuery::new().emotions(EmotionTarget::default().arousal(50.0));
        assert!(relevance_score(&rec, &query, now, &cfg) >= 0.0);
    }

    #[test]
    fn reasons_in_order() {
        let rec = record_at(Utc::now());
        let query = MemoryQuery::new()
            .context("work")
            .participants(["aton", "logan", "zed"]);
        let reasons = match_reasons(&rec, &query);

        assert_eq!(reasons.len(), 3);
        assert_eq!(reasons[0], "context match: work");
        // Record order, duplicates preserved.
        assert_eq!(reasons[1], "shared participants: logan, aton, logan");
        assert_eq!(reasons[2], format!("high significance: {:.2}", rec.significance));
    }

    #[test]
    fn reasons_skip_misses() {
        let rec = record_at(Utc::now());
        let query = MemoryQuery::new()
            .context("social")
            .participants(["zed"])
            .significance_floor(1.1);
        assert!(match_reasons(&rec, &query).is_empty());
    }

    #[test]
    fn empty_query_context_adds_no_reason() {
        let mut rec = record_at(Utc::now());
        rec.context = String::new();
        let query = MemoryQuery::new().context("").significance_floor(1.1);
        assert!(match_reasons(&rec, &query).is_empty());
    }
}
