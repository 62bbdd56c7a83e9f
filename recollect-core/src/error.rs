//! Error types for the recollect core library.

use thiserror::Error;

/// Top-level error type for all recollect operations.
#[derive(Error, Debug)]
pub enum RecollectError {
    /// The record store could not be opened or reached.
    #[error("Record store unavailable: {0}")]
    StoreUnavailable(String),

    /// SQLite persistence error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A JSON column could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A stored record id is not a valid UUID.
    #[error("Invalid record id: {0}")]
    InvalidRecordId(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for RecollectError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, RecollectError>;
