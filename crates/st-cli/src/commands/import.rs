//! Import command: load sessions from a JSON array file.
//!
//! The batch never aborts: a record missing any of `start_time`, `end_time`,
//! or `duration_seconds` is skipped, and a per-record insertion failure is
//! swallowed. Only the count of successfully added records is reported.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::Deserialize;

use st_core::NewSession;
use st_db::Database;

/// One acceptable import record. `id` is allowed but ignored; the store
/// assigns fresh IDs.
#[derive(Debug, Deserialize)]
struct ImportRecord {
    start_time: NaiveDateTime,
    end_time: NaiveDateTime,
    duration_seconds: i64,
}

pub fn run<W: Write>(writer: &mut W, db: &Database, file: &Path) -> Result<usize> {
    let contents = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let records: Vec<serde_json::Value> =
        serde_json::from_str(&contents).context("import file is not a JSON array")?;

    let mut added = 0;
    for value in records {
        let Ok(record) = serde_json::from_value::<ImportRecord>(value) else {
            tracing::debug!("skipping import record with missing or invalid fields");
            continue;
        };
        let session = NewSession {
            start: record.start_time,
            end: record.end_time,
            duration_seconds: record.duration_seconds,
        };
        match db.insert_log(&session) {
            Ok(_) => added += 1,
            Err(error) => tracing::debug!(%error, "skipping record that failed to insert"),
        }
    }

    writeln!(writer, "Imported {added} sessions.")?;
    Ok(added)
}
