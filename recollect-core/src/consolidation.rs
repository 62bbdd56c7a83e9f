//! Memory Consolidation: linking related records after a write.
//!
//! A consolidation pass looks at records written around the same time in the
//! same context (any context when the record has none) and links the new record to those that share a theme:
//!   - a participant in common, or
//!   - at least two shared long words across events and outcome.
//!
//! Links are one-directional: only the new record is updated.

use std::collections::{BTreeSet, HashSet};

use chrono::Duration;
use tracing::debug;

use crate::config::{ConsolidationConfig, LinkPolicy};
use crate::error::Result;
use crate::record::EpisodicRecord;
use crate::store::{RecordStore, StoreFilter};
use crate::types::{RecordId, TimeRange};

/// Result of a consolidation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsolidationOutcome {
    /// The target record no longer exists; nothing was done.
    Missing,
    /// No related records were found; the record was not rewritten.
    NoRelated,
    /// The record was updated with links to related records.
    Linked {
        /// Number of related records found in this pass.
        count: usize,
    },
}

/// Run one consolidation pass for `id`.
///
/// # Errors
/// Propagates store errors. The worker logs and suppresses them.
pub fn consolidate(
    store: &dyn RecordStore,
    id: RecordId,
    config: &ConsolidationConfig,
) -> Result<ConsolidationOutcome> {
    let Some(mut target) = store.get(id)? else {
        debug!(%id, "Consolidation target vanished");
        return Ok(ConsolidationOutcome::Missing);
    };

    let candidates = store.query(&StoreFilter {
        time_range: Some(TimeRange::around(
            target.timestamp,
            Duration::hours(config.window_hours),
        )),
        context: Some(target.context.clone()).filter(|c| !c.is_empty()),
        significance_floor: None,
        limit: Some(config.candidate_limit),
    })?;

    let related: BTreeSet<RecordId> = candidates
        .iter()
        .filter(|c| c.id != target.id)
        .filter(|c| has_thematic_overlap(&target, c, config))
        .map(|c| c.id)
        .collect();

    if related.is_empty() {
        debug!(%id, candidates = candidates.len(), "No related records");
        return Ok(ConsolidationOutcome::NoRelated);
    }

    let count = related.len();
    match config.link_policy {
        LinkPolicy::Replace => target.links = related,
        LinkPolicy::Union => target.links.extend(related),
    }
    store.put(&target)?;

    debug!(%id, linked = count, total_links = target.links.len(), "Record consolidated");
    Ok(ConsolidationOutcome::Linked { count })
}

/// Whether two records share a theme.
#[must_use]
pub fn has_thematic_overlap(a: &EpisodicRecord, b: &EpisodicRecord, config: &ConsolidationConfig) -> bool {
    if a.participants.iter().any(|p| b.participants.contains(p)) {
        return true;
    }

    let words_a = long_words(&a.narrative(), config.min_word_len);
    let words_b = long_words(&b.narrative(), config.min_word_len);
    words_a.intersection(&words_b).count() >= config.min_shared_words
}

/// Lowercased words of `text`, split on runs of non-word characters
/// (anything but ASCII letters, digits and `_`).
#[must_use]
pub fn tokenize(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

fn long_words(text: &str, min_len: usize) -> HashSet<String> {
    let mut words = tokenize(text);
    words.retain(|w| w.chars().count() >= min_len);
    words
}
