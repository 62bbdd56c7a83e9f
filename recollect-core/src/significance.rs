//! Significance scoring: how much an interaction matters, fixed at write time.
//!
//! Significance = Intensity + Complexity + Outcome + Learning + Social, capped at 1.0
//!
//! Where:
//!   Intensity  = (|valence| + arousal) × 0.3
//!   Complexity = min(events × 0.1, 0.3)
//!   Outcome    = min(outcome_chars / 100, 0.2)
//!   Learning   = 0.3 if any text mentions a learning keyword (case-insensitive)
//!   Social     = 0.2 if any event mentions "conversation" or "collaboration"

use crate::types::EmotionalState;

/// Keywords that mark an interaction as a learning moment.
pub const LEARNING_KEYWORDS: [&str; 6] = [
    "learned",
    "discovered",
    "realized",
    "understood",
    "mistake",
    "insight",
];

/// Event substrings that mark a social interaction (matched case-sensitively).
pub const SOCIAL_MARKERS: [&str; 2] = ["conversation", "collaboration"];

const INTENSITY_WEIGHT: f64 = 0.3;
const PER_EVENT: f64 = 0.1;
const MAX_COMPLEXITY: f64 = 0.3;
const OUTCOME_CHARS_PER_POINT: f64 = 100.0;
const MAX_OUTCOME: f64 = 0.2;
const LEARNING_BONUS: f64 = 0.3;
const SOCIAL_BONUS: f64 = 0.2;

/// Per-term contributions to a significance score.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SignificanceBreakdown {
    /// Emotional intensity term.
    pub intensity: f64,
    /// Event-count term.
    pub complexity: f64,
    /// Outcome-length term.
    pub outcome: f64,
    /// Learning-keyword bonus.
    pub learning: f64,
    /// Social-interaction bonus.
    pub social: f64,
}

impl SignificanceBreakdown {
    /// Sum of all terms, clamped to [0, 1].
    #[must_use]
    pub fn total(&self) -> f64 {
        (self.intensity + self.complexity + self.outcome + self.learning + self.social)
            .clamp(0.0, 1.0)
    }
}

/// Score an interaction. Pure and deterministic; never fails.
#[must_use]
pub fn score(events: &[String], emotions: &EmotionalState, outcome: &str) -> f64 {
    breakdown(events, emotions, outcome).total()
}

/// Compute every significance term separately.
#[must_use]
pub fn breakdown(events: &[String], emotions: &EmotionalState, outcome: &str) -> SignificanceBreakdown {
    #[allow(clippy::cast_precision_loss)]
    let complexity = (events.len() as f64 * PER_EVENT).min(MAX_COMPLEXITY);
    #[allow(clippy::cast_precision_loss)]
    let outcome_term = (outcome.chars().count() as f64 / OUTCOME_CHARS_PER_POINT).min(MAX_OUTCOME);

    SignificanceBreakdown {
        intensity: f64::from(emotions.intensity()) * INTENSITY_WEIGHT,
        complexity,
        outcome: outcome_term,
        learning: if mentions_learning(events, outcome) {
            LEARNING_BONUS
        } else {
            0.0
        },
        social: if mentions_social(events) {
            SOCIAL_BONUS
        } else {
            0.0
        },
    }
}

/// Whether the outcome or any event contains a learning keyword, ignoring case.
#[must_use]
pub fn mentions_learning(events: &[String], outcome: &str) -> bool {
    let has_keyword = |text: &str| {
        let lower = text.to_lowercase();
        LEARNING_KEYWORDS.iter().any(|k| lower.contains(k))
    };
    has_keyword(outcome) || events.iter().any(|e| has_keyword(e))
}

/// Whether any event mentions a social marker. Case matters here.
#[must_use]
pub fn mentions_social(events: &[String]) -> bool {
    events
        .iter()
        .any(|e| SOCIAL_MARKERS.iter().any(|m| e.contains(m)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn empty_input_scores_zero() {
        let s = score(&[], &EmotionalState::default(), "");
        assert!(s.abs() < f64::EPSILON);
    }

    #[test]
    fn complexity_caps_at_three_events() {
        let few = breakdown(&strings(&["a", "b"]), &EmotionalState::default(), "");
        let many = breakdown(&strings(&["a", "b", "c", "d", "e"]), &EmotionalState::default(), "");
        assert!((few.complexity - 0.2).abs() < 1e-9);
        assert!((many.complexity - 0.3).abs() < 1e-9);
    }

    #[test]
    fn outcome_term_caps_at_two_tenths() {
        let short = breakdown(&[], &EmotionalState::default(), "0123456789");
        let long = breakdown(&[], &EmotionalState::default(), &"x".repeat(500));
        assert!((short.outcome - 0.1).abs() < 1e-9);
        assert!((long.outcome - 0.2).abs() < 1e-9);
    }

    #[test]
    fn learning_keyword_is_case_insensitive() {
        let b = breakdown(&strings(&["We DISCOVERED a leak"]), &EmotionalState::default(), "");
        assert!((b.learning - 0.3).abs() < 1e-9);

        let b = breakdown(&[], &EmotionalState::default(), "an Insight emerged");
        assert!((b.learning - 0.3).abs() < 1e-9);
    }

    #[test]
    fn social_marker_is_case_sensitive() {
        let hit = breakdown(&strings(&["long conversation"]), &EmotionalState::default(), "");
        let miss = breakdown(&strings(&["Conversation"]), &EmotionalState::default(), "");
        assert!((hit.social - 0.2).abs() < 1e-9);
        assert!(miss.social.abs() < f64::EPSILON);
    }

    #[test]
    fn social_marker_only_checks_events() {
        let b = breakdown(&[], &EmotionalState::default(), "a conversation");
        assert!(b.social.abs() < f64::EPSILON);
    }

    #[test]
    fn total_is_capped_at_one() {
        let events = strings(&[
            "Discovered major breakthrough in AI reasoning",
            "Realized fundamental flaw in previous approach",
            "collaboration with the team",
        ]);
        let s = score(
            &events,
            &EmotionalState::new(0.9, 0.8, 0.7),
            "Learned that previous assumptions were wrong and developed new framework",
        );
        assert!((s - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn greeting_scores_low() {
        let s = score(
            &strings(&["Said hello"]),
            &EmotionalState::new(0.1, 0.1, 0.5),
            "Brief greeting",
        );
        assert!(s > 0.1 && s < 0.35, "got {s}");
    }
}
