//! Core type definitions shared across the recollect memory system.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::RecollectError;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Unique identifier for an episodic record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(pub Uuid);

impl RecordId {
    /// Create a new random record ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = RecollectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| RecollectError::InvalidRecordId(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Emotional Model: valence / arousal / dominance
// ---------------------------------------------------------------------------

/// Emotional state attached to a record at creation time.
///
/// - **Valence**: negative (-1) → positive (+1)
/// - **Arousal**: calm (0) → excited (1)
/// - **Dominance**: submissive (0) → dominant (1)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EmotionalState {
    /// Negative (-1.0) to positive (+1.0).
    pub valence: f32,
    /// Calm (0.0) to excited (1.0).
    pub arousal: f32,
    /// Submissive (0.0) to dominant (1.0).
    pub dominance: f32,
    /// Named emotions (joy, frustration, curiosity, ...).
    #[serde(default)]
    pub specific_emotions: BTreeSet<String>,
}

impl EmotionalState {
    /// Create a new emotional state, clamping each axis into its domain.
    #[must_use]
    pub fn new(valence: f32, arousal: f32, dominance: f32) -> Self {
        Self {
            valence: valence.clamp(-1.0, 1.0),
            arousal: arousal.clamp(0.0, 1.0),
            dominance: dominance.clamp(0.0, 1.0),
            specific_emotions: BTreeSet::new(),
        }
    }

    /// Attach named emotions.
    #[must_use]
    pub fn with_emotions<I, S>(mut self, emotions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.specific_emotions
            .extend(emotions.into_iter().map(Into::into));
        self
    }

    /// Emotional intensity as used by significance scoring: `|valence| + arousal`.
    #[must_use]
    pub fn intensity(&self) -> f32 {
        self.valence.abs() + self.arousal
    }
}

/// A partial emotional target used when searching.
///
/// Only the dimensions that are `Some` take part in similarity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EmotionTarget {
    /// Target valence, if any.
    pub valence: Option<f32>,
    /// Target arousal, if any.
    pub arousal: Option<f32>,
    /// Target dominance, if any.
    pub dominance: Option<f32>,
}

impl EmotionTarget {
    /// Target with no dimensions specified.
    pub const EMPTY: Self = Self {
        valence: None,
        arousal: None,
        dominance: None,
    };

    /// Set the valence target.
    #[must_use]
    pub fn valence(mut self, v: f32) -> Self {
        self.valence = Some(v);
        self
    }

    /// Set the arousal target.
    #[must_use]
    pub fn arousal(mut self, a: f32) -> Self {
        self.arousal = Some(a);
        self
    }

    /// Set the dominance target.
    #[must_use]
    pub fn dominance(mut self, d: f32) -> Self {
        self.dominance = Some(d);
        self
    }

    /// Whether no dimension is specified.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.valence.is_none() && self.arousal.is_none() && self.dominance.is_none()
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Inclusive wall-clock time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Earliest timestamp included.
    pub start: DateTime<Utc>,
    /// Latest timestamp included.
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// Create a new range.
    #[must_use]
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Range of `radius` on either side of `center`.
    #[must_use]
    pub fn around(center: DateTime<Utc>, radius: chrono::Duration) -> Self {
        Self {
            start: center - radius,
            end: center + radius,
        }
    }

    /// Whether `ts` lies inside the range (bounds included).
    #[must_use]
    pub fn contains(&self, ts: &DateTime<Utc>) -> bool {
        *ts >= self.start && *ts <= self.end
    }
}
