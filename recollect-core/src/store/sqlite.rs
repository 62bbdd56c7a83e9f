//! SQLite record store.
//!
//! One row per record. List-valued fields are stored as JSON text so the
//! schema stays stable if the record shape grows:
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS episodic_records (
//!     id           TEXT PRIMARY KEY,
//!     timestamp    INTEGER NOT NULL,   -- unix milliseconds
//!     participants TEXT NOT NULL,      -- JSON array
//!     context      TEXT NOT NULL,
//!     events       TEXT NOT NULL,      -- JSON array
//!     emotions     TEXT NOT NULL,      -- JSON object
//!     outcome      TEXT NOT NULL,
//!     significance REAL NOT NULL,
//!     links        TEXT NOT NULL,      -- JSON array of ids
//!     created_at   TEXT NOT NULL
//! );
//! ```
//!
//! The connection lives behind a mutex so the store can be shared with the
//! consolidation worker.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, params_from_iter, Connection, OpenFlags, OptionalExtension, Row};
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::error::{RecollectError, Result};
use crate::record::EpisodicRecord;
use crate::store::{RecordStore, StoreFilter, StoreStats};
use crate::types::RecordId;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS episodic_records (
        id           TEXT PRIMARY KEY,
        timestamp    INTEGER NOT NULL,
        participants TEXT NOT NULL,
        context      TEXT NOT NULL,
        events       TEXT NOT NULL,
        emotions     TEXT NOT NULL,
        outcome      TEXT NOT NULL,
        significance REAL NOT NULL,
        links        TEXT NOT NULL,
        created_at   TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_records_timestamp ON episodic_records(timestamp);
    CREATE INDEX IF NOT EXISTS idx_records_context ON episodic_records(context);
    CREATE INDEX IF NOT EXISTS idx_records_significance ON episodic_records(significance);
";

const SELECT_COLUMNS: &str = "SELECT id, timestamp, participants, context, events, emotions, \
                              outcome, significance, links FROM episodic_records";

/// Handle to an open SQLite database of episodic records.
///
/// # Usage
///
/// ```no_run
/// # use recollect_core::store::{RecordStore, SqliteStore};
/// # use recollect_core::config::StoreConfig;
/// let store = SqliteStore::open(&StoreConfig::default())?;
/// let stats = store.aggregate_stats()?;
/// # Ok::<(), recollect_core::error::RecollectError>(())
/// ```
pub struct SqliteStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("db_path", &self.db_path)
            .finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Open (or create) the database at `config.path`.
    ///
    /// The schema is created if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`RecollectError::StoreUnavailable`] if the file cannot be
    /// opened, or [`RecollectError::Database`] if schema setup fails.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let db_path = config.path.clone();
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        let conn = Connection::open_with_flags(&db_path, flags).map_err(|e| {
            RecollectError::StoreUnavailable(format!("{}: {e}", db_path.display()))
        })?;

        if config.wal_mode {
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        }
        conn.execute_batch("PRAGMA synchronous = NORMAL;")?;
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        conn.execute_batch(SCHEMA)?;

        info!(
            path = %db_path.display(),
            wal = config.wal_mode,
            "Record store opened"
        );

        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
        })
    }

    /// Open an in-memory database (useful for tests).
    ///
    /// # Errors
    ///
    /// Returns [`RecollectError::Database`] on SQLite failures.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
            db_path: PathBuf::from(":memory:"),
        })
    }

    /// Delete a record. Returns `true` if a row was removed.
    ///
    /// # Errors
    ///
    /// Returns [`RecollectError::Database`] on SQLite failures.
    pub fn remove(&self, id: RecordId) -> Result<bool> {
        let deleted = self.conn.lock().execute(
            "DELETE FROM episodic_records WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(deleted > 0)
    }

    /// Total number of stored records.
    ///
    /// # Errors
    ///
    /// Returns [`RecollectError::Database`] on SQLite failures.
    pub fn record_count(&self) -> Result<u64> {
        let count: i64 =
            self.conn
                .lock()
                .query_row("SELECT COUNT(*) FROM episodic_records", [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// Run an integrity check on the database.
    ///
    /// # Errors
    ///
    /// Returns [`RecollectError::Database`] if the check itself fails.
    pub fn integrity_check(&self) -> Result<bool> {
        let result: String = self
            .conn
            .lock()
            .query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
        Ok(result == "ok")
    }

    /// Path to the database file (or `:memory:`).
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

impl RecordStore for SqliteStore {
    fn put(&self, record: &EpisodicRecord) -> Result<()> {
        let start = Instant::now();

        let participants = serde_json::to_string(&record.participants)?;
        let events = serde_json::to_string(&record.events)?;
        let emotions = serde_json::to_string(&record.emotions)?;
        let links = serde_json::to_string(&record.links)?;

        self.conn.lock().execute(
            "INSERT INTO episodic_records
                (id, timestamp, participants, context, events, emotions,
                 outcome, significance, links, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(id) DO UPDATE SET
                timestamp = excluded.timestamp,
                participants = excluded.participants,
                context = excluded.context,
                events = excluded.events,
                emotions = excluded.emotions,
                outcome = excluded.outcome,
                significance = excluded.significance,
                links = excluded.links",
            params![
                record.id.to_string(),
                record.timestamp.timestamp_millis(),
                participants,
                record.context,
                events,
                emotions,
                record.outcome,
                record.significance,
                links,
                Utc::now().to_rfc3339(),
            ],
        )?;

        debug!(
            id = %record.id,
            context = %record.context,
            links = record.links.len(),
            elapsed_us = start.elapsed().as_micros(),
            "Stored record"
        );
        Ok(())
    }

    fn get(&self, id: RecordId) -> Result<Option<EpisodicRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(&format!("{SELECT_COLUMNS} WHERE id = ?1"))?;
        let raw = stmt
            .query_row(params![id.to_string()], RawRow::from_row)
            .optional()?;
        raw.map(RawRow::into_record).transpose()
    }

    fn query(&self, filter: &StoreFilter) -> Result<Vec<EpisodicRecord>> {
        let start = Instant::now();

        let mut sql = format!("{SELECT_COLUMNS} WHERE 1=1");
        let mut args: Vec<rusqlite::types::Value> = Vec::new();

        if let Some(range) = filter.time_range {
            sql.push_str(" AND timestamp >= ? AND timestamp <= ?");
            args.push(range.start.timestamp_millis().into());
            args.push(range.end.timestamp_millis().into());
        }
        if let Some(context) = &filter.context {
            sql.push_str(" AND context = ?");
            args.push(context.clone().into());
        }
        if let Some(floor) = filter.significance_floor {
            sql.push_str(" AND significance >= ?");
            args.push(floor.into());
        }
        sql.push_str(" ORDER BY significance DESC, timestamp DESC LIMIT ?");
        args.push(i64::try_from(filter.limit()).unwrap_or(i64::MAX).into());

        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(&sql)?;
        let rows = stmt.query_map(params_from_iter(args), RawRow::from_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?.into_record()?);
        }

        debug!(
            hits = records.len(),
            elapsed_us = start.elapsed().as_micros(),
            "Queried records"
        );
        Ok(records)
    }

    fn aggregate_stats(&self) -> Result<StoreStats> {
        let conn = self.conn.lock();

        let (count, avg): (i64, Option<f64>) = conn.query_row(
            "SELECT COUNT(*), AVG(significance) FROM episodic_records",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let mut stmt = conn
            .prepare_cached("SELECT context, COUNT(*) FROM episodic_records GROUP BY context")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut group_counts = BTreeMap::new();
        for row in rows {
            let (context, n) = row?;
            group_counts.insert(context, u64::try_from(n).unwrap_or(0));
        }

        Ok(StoreStats {
            count: u64::try_from(count).unwrap_or(0),
            group_counts,
            avg_significance: avg.unwrap_or(0.0),
        })
    }
}

/// Columns of one row, before JSON decoding.
struct RawRow {
    id: String,
    timestamp_ms: i64,
    participants: String,
    context: String,
    events: String,
    emotions: String,
    outcome: String,
    significance: f64,
    links: String,
}

impl RawRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            timestamp_ms: row.get(1)?,
            participants: row.get(2)?,
            context: row.get(3)?,
            events: row.get(4)?,
            emotions: row.get(5)?,
            outcome: row.get(6)?,
            significance: row.get(7)?,
            links: row.get(8)?,
        })
    }

    fn into_record(self) -> Result<EpisodicRecord> {
        let timestamp = DateTime::<Utc>::from_timestamp_millis(self.timestamp_ms).ok_or_else(|| {
            RecollectError::Serialization(format!("timestamp out of range: {}", self.timestamp_ms))
        })?;

        Ok(EpisodicRecord {
            id: self.id.parse()?,
            timestamp,
            participants: serde_json::from_str(&self.participants)?,
            context: self.context,
            events: serde_json::from_str(&self.events)?,
            emotions: serde_json::from_str(&self.emotions)?,
            outcome: self.outcome,
            significance: self.significance,
            links: serde_json::from_str(&self.links)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
