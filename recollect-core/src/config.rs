//! Configuration for the recollect memory system.
//!
//! Maps directly to `recollect.toml`. Every field has a default, so an empty
//! file (or no file) yields a working configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecollectConfig {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Record store settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Search / relevance settings.
    #[serde(default)]
    pub search: SearchConfig,
    /// Background consolidation settings.
    #[serde(default)]
    pub consolidation: ConsolidationConfig,
}

impl RecollectConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `RecollectError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::RecollectError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// General system settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level used when `RUST_LOG` is unset: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Log output format: "compact" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

/// SQLite record store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database file path.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
    /// Use WAL mode for concurrent reads.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
    /// How long SQLite waits on a locked database, in milliseconds.
    #[serde(default = "default_5000")]
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            wal_mode: true,
            busy_timeout_ms: 5000,
        }
    }
}

/// Relevance scoring settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Result limit when a query does not set one.
    #[serde(default = "default_50")]
    pub default_limit: usize,
    /// Records closer than this many days to "now" earn a recency bonus.
    #[serde(default = "default_30_f64")]
    pub recency_window_days: f64,
    /// Maximum recency bonus.
    #[serde(default = "default_0_2")]
    pub recency_weight: f64,
    /// Weight applied to emotional similarity.
    #[serde(default = "default_0_3")]
    pub emotional_weight: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: 50,
            recency_window_days: 30.0,
            recency_weight: 0.2,
            emotional_weight: 0.3,
        }
    }
}

/// How a consolidation pass writes the links it found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkPolicy {
    /// Overwrite the record's links with the newly found set.
    #[default]
    Replace,
    /// Merge the newly found set into the existing links.
    Union,
}

/// Background consolidation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidationConfig {
    /// Delay between a write and its consolidation pass, in milliseconds.
    #[serde(default = "default_1000")]
    pub delay_ms: u64,
    /// Candidates must lie within this many hours of the target.
    #[serde(default = "default_24")]
    pub window_hours: i64,
    /// Maximum number of records fetched as candidates (target included).
    #[serde(default = "default_10")]
    pub candidate_limit: usize,
    /// Shared long words needed for a thematic match.
    #[serde(default = "default_2")]
    pub min_shared_words: usize,
    /// Minimum character length of a word counted as shared.
    #[serde(default = "default_4")]
    pub min_word_len: usize,
    /// Replace or merge existing links.
    #[serde(default)]
    pub link_policy: LinkPolicy,
}

impl Default for ConsolidationConfig {
    fn default() -> Self {
        Self {
            delay_ms: 1000,
            window_hours: 24,
            candidate_limit: 10,
            min_shared_words: 2,
            min_word_len: 4,
            link_policy: LinkPolicy::Replace,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_true() -> bool { true }
fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }
fn default_db_path() -> PathBuf { PathBuf::from("recollect.db") }
fn default_0_2() -> f64 { 0.2 }
fn default_0_3() -> f64 { 0.3 }
fn default_30_f64() -> f64 { 30.0 }
fn default_2() -> usize { 2 }
fn default_4() -> usize { 4 }
fn default_10() -> usize { 10 }
fn default_24() -> i64 { 24 }
fn default_50() -> usize { 50 }
fn default_1000() -> u64 { 1000 }
fn default_5000() -> u64 { 5000 }
