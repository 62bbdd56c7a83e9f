//! Episodic Record: "What happened"
//!
//! One discrete interaction: who took part, in what context, the ordered
//! events, how it felt, and how it turned out. Significance is fixed at
//! creation; only the link set changes afterwards.

use std::collections::BTreeSet;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::significance;
use crate::types::{EmotionalState, RecordId};

/// A single stored interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodicRecord {
    /// Unique identifier for this record.
    pub id: RecordId,
    /// Creation time (millisecond precision).
    pub timestamp: DateTime<Utc>,
    /// Who took part, in insertion order. Duplicates are kept.
    pub participants: Vec<String>,
    /// Free-form category tag ("work", "social", ...).
    pub context: String,
    /// What happened, in chronological order.
    pub events: Vec<String>,
    /// How the interaction felt.
    pub emotions: EmotionalState,
    /// What was accomplished or learned.
    pub outcome: String,
    /// Importance score in [0, 1], assigned once at creation.
    pub significance: f64,
    /// Ids of thematically related records. Written by consolidation only.
    #[serde(default)]
    pub links: BTreeSet<RecordId>,
}

impl EpisodicRecord {
    /// Create a new record stamped with the current time and scored by
    /// [`significance::score`].
    #[must_use]
    pub fn new(
        participants: Vec<String>,
        context: impl Into<String>,
        events: Vec<String>,
        emotions: EmotionalState,
        outcome: impl Into<String>,
    ) -> Self {
        Self::at(
            Utc::now(),
            participants,
            context,
            events,
            emotions,
            outcome,
        )
    }

    /// Create a new record with an explicit timestamp.
    ///
    /// The timestamp is truncated to milliseconds, the precision the stores keep.
    #[must_use]
    pub fn at(
        timestamp: DateTime<Utc>,
        participants: Vec<String>,
        context: impl Into<String>,
        events: Vec<String>,
        emotions: EmotionalState,
        outcome: impl Into<String>,
    ) -> Self {
        let outcome = outcome.into();
        let significance = significance::score(&events, &emotions, &outcome);

        Self {
            id: RecordId::new(),
            timestamp: timestamp.trunc_subsecs(3),
            participants,
            context: context.into(),
            events,
            emotions,
            outcome,
            significance,
            links: BTreeSet::new(),
        }
    }

    /// Events followed by the outcome, joined by spaces.
    #[must_use]
    pub fn narrative(&self) -> String {
        let mut text = self.events.join(" ");
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(&self.outcome);
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_is_scored_and_unlinked() {
        let rec = EpisodicRecord::new(
            vec!["ada".into()],
            "work",
            vec!["Reviewed the parser".into()],
            EmotionalState::new(0.5, 0.5, 0.5),
            "Found a mistake in the grammar",
        );
        assert!(rec.significance > 0.3);
        assert!(rec.links.is_empty());
        assert_eq!(rec.timestamp.timestamp_subsec_nanos() % 1_000_000, 0);
    }

    #[test]
    fn narrative_joins_events_and_outcome() {
        let rec = EpisodicRecord::new(
            vec![],
            "work",
            vec!["one".into(), "two".into()],
            EmotionalState::default(),
            "three",
        );
        assert_eq!(rec.narrative(), "one two three");
    }
}
