//! Storage layer for the study tracker.
//!
//! Provides persistence for study session logs using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but
//! not `Sync`. The serve daemon moves its instance into a single owner task
//! and funnels every mutation through it; CLI commands each own a short-lived
//! connection. No additional locking is required because there is exactly one
//! mutator at a time.
//!
//! # Schema
//!
//! One table. Timestamps are stored as TEXT in ISO 8601 without an offset
//! (e.g., `2024-01-15T10:30:00`), so lexicographic ordering matches
//! chronological ordering and range scans on `start_time` stay index-friendly.
//! `duration_seconds` is authoritative: manual edits may leave `end_time`
//! out of sync with `start_time + duration_seconds`, and readers must not
//! assume otherwise.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

use st_core::{LogRecord, NewSession};

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse a stored timestamp.
    #[error("invalid timestamp for log {log_id}: {timestamp}")]
    TimestampParse {
        log_id: i64,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Outcome of a deduction pass over one date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deduction {
    /// The date had no sessions; nothing changed. Informational, not an error.
    NoSessions,
    /// Sessions were consumed in descending start-time order.
    Applied {
        /// Sessions fully deleted.
        deleted: usize,
        /// New duration of the session that was shrunk, if any.
        shrunk_to: Option<i64>,
    },
}

/// Outcome of a direct duration edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Adjustment {
    /// No log with the given ID exists.
    NotFound,
    /// The delta drove the duration to zero or below; the log was deleted.
    Deleted,
    /// Duration updated and `end_time` recomputed from `start_time`.
    Updated { new_duration: i64 },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                duration_seconds INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_logs_start ON logs(start_time);
            ",
        )?;
        Ok(())
    }

    /// Inserts a session, returning its assigned ID.
    pub fn insert_log(&self, session: &NewSession) -> Result<i64, DbError> {
        self.conn.execute(
            "INSERT INTO logs (start_time, end_time, duration_seconds) VALUES (?, ?, ?)",
            params![
                format_timestamp(session.start),
                format_timestamp(session.end),
                session.duration_seconds,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Lists logs ordered by start time descending. `limit` of 0 means all.
    pub fn list_logs(&self, limit: usize) -> Result<Vec<LogRecord>, DbError> {
        let mut query = String::from(
            "SELECT id, start_time, end_time, duration_seconds
             FROM logs
             ORDER BY start_time DESC, id DESC",
        );
        if limit > 0 {
            query.push_str(&format!(" LIMIT {limit}"));
        }
        let mut stmt = self.conn.prepare(&query)?;
        let rows = stmt.query_map([], raw_log)?;
        collect_logs(rows)
    }

    /// Fetches a single log by ID.
    pub fn get_log(&self, id: i64) -> Result<Option<LogRecord>, DbError> {
        let raw = self
            .conn
            .query_row(
                "SELECT id, start_time, end_time, duration_seconds FROM logs WHERE id = ?",
                params![id],
                raw_log,
            )
            .optional()?;
        raw.map(into_record).transpose()
    }

    /// Lists logs whose start date equals `date`, newest first.
    pub fn logs_on_date(&self, date: NaiveDate) -> Result<Vec<LogRecord>, DbError> {
        let day_start = date.and_time(NaiveTime::MIN);
        let day_end = day_start + Duration::days(1);
        let mut stmt = self.conn.prepare(
            "SELECT id, start_time, end_time, duration_seconds
             FROM logs
             WHERE start_time >= ? AND start_time < ?
             ORDER BY start_time DESC, id DESC",
        )?;
        let rows = stmt.query_map(
            params![format_timestamp(day_start), format_timestamp(day_end)],
            raw_log,
        )?;
        collect_logs(rows)
    }

    /// Deletes a log by ID, returning whether a row was removed.
    pub fn delete_log(&self, id: i64) -> Result<bool, DbError> {
        let changed = self
            .conn
            .execute("DELETE FROM logs WHERE id = ?", params![id])?;
        Ok(changed > 0)
    }

    /// Consumes `seconds` of recorded time from `date`, newest session first.
    ///
    /// A session whose duration fits within the remaining deduction is
    /// deleted outright; the first session that exceeds it is shrunk (with
    /// `end_time` recomputed from `start_time`) and the pass stops. The
    /// whole pass is one transaction, so a failure leaves the date intact.
    /// No negative-duration row is ever produced.
    pub fn deduct_on_date(&mut self, date: NaiveDate, seconds: i64) -> Result<Deduction, DbError> {
        let logs = self.logs_on_date(date)?;
        if logs.is_empty() {
            return Ok(Deduction::NoSessions);
        }

        let tx = self.conn.transaction()?;
        let mut remaining = seconds;
        let mut deleted = 0;
        let mut shrunk_to = None;
        for log in logs {
            if remaining <= 0 {
                break;
            }
            if remaining >= log.duration_seconds {
                tx.execute("DELETE FROM logs WHERE id = ?", params![log.id])?;
                deleted += 1;
                remaining -= log.duration_seconds;
            } else {
                let new_duration = log.duration_seconds - remaining;
                let new_end = log.start + Duration::seconds(new_duration);
                tx.execute(
                    "UPDATE logs SET duration_seconds = ?, end_time = ? WHERE id = ?",
                    params![new_duration, format_timestamp(new_end), log.id],
                )?;
                shrunk_to = Some(new_duration);
                remaining = 0;
            }
        }
        tx.commit()?;
        tracing::debug!(%date, deducted = seconds - remaining.max(0), deleted, "deduction applied");
        Ok(Deduction::Applied { deleted, shrunk_to })
    }

    /// Applies a signed duration delta to one log.
    ///
    /// A resulting duration of zero or below deletes the log; otherwise the
    /// duration is updated and `end_time` recomputed as
    /// `start_time + new_duration`.
    pub fn adjust_log(&self, id: i64, delta_seconds: i64) -> Result<Adjustment, DbError> {
        let Some(log) = self.get_log(id)? else {
            return Ok(Adjustment::NotFound);
        };
        let new_duration = log.duration_seconds + delta_seconds;
        if new_duration <= 0 {
            self.delete_log(id)?;
            return Ok(Adjustment::Deleted);
        }
        let new_end = log.start + Duration::seconds(new_duration);
        self.conn.execute(
            "UPDATE logs SET duration_seconds = ?, end_time = ? WHERE id = ?",
            params![new_duration, format_timestamp(new_end), id],
        )?;
        Ok(Adjustment::Updated { new_duration })
    }

    /// Total seconds per calendar date for one year.
    pub fn daily_summary(&self, year: i32) -> Result<BTreeMap<NaiveDate, i64>, DbError> {
        let year_start = format!("{year:04}-01-01T00:00:00");
        let year_end = format!("{:04}-01-01T00:00:00", year + 1);
        let mut stmt = self.conn.prepare(
            "SELECT date(start_time) AS log_date, SUM(duration_seconds) AS total_seconds
             FROM logs
             WHERE start_time >= ? AND start_time < ?
             GROUP BY log_date
             ORDER BY log_date ASC",
        )?;
        let rows = stmt.query_map(params![year_start, year_end], |row| {
            let log_date: String = row.get(0)?;
            let total_seconds: i64 = row.get(1)?;
            Ok((log_date, total_seconds))
        })?;

        let mut summary = BTreeMap::new();
        for row in rows {
            let (log_date, total_seconds) = row?;
            let date = log_date
                .parse::<NaiveDate>()
                .map_err(|source| DbError::TimestampParse {
                    log_id: 0,
                    timestamp: log_date,
                    source,
                })?;
            summary.insert(date, total_seconds);
        }
        Ok(summary)
    }
}

/// Log row before timestamp parsing.
type RawLog = (i64, String, String, i64);

fn raw_log(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawLog> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn into_record(raw: RawLog) -> Result<LogRecord, DbError> {
    let (id, start, end, duration_seconds) = raw;
    Ok(LogRecord {
        id,
        start: parse_timestamp(id, &start)?,
        end: parse_timestamp(id, &end)?,
        duration_seconds,
    })
}

fn collect_logs(
    rows: impl Iterator<Item = rusqlite::Result<RawLog>>,
) -> Result<Vec<LogRecord>, DbError> {
    let mut logs = Vec::new();
    for row in rows {
        logs.push(into_record(row?)?);
    }
    Ok(logs)
}

/// Formats a timestamp for storage.
pub fn format_timestamp(value: NaiveDateTime) -> String {
    value.format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Parses a stored timestamp, tolerating fractional seconds from older data.
fn parse_timestamp(log_id: i64, value: &str) -> Result<NaiveDateTime, DbError> {
    value
        .parse::<NaiveDateTime>()
        .map_err(|source| DbError::TimestampParse {
            log_id,
            timestamp: value.to_string(),
            source,
        })
}
