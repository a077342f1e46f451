//! Session log commands: list, add, deduct, edit, delete.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;

use st_core::{NewSession, ValidationError, hms};
use st_db::{Adjustment, Database, Deduction};

#[allow(clippy::cast_precision_loss)]
pub fn list<W: Write>(writer: &mut W, db: &Database, limit: usize) -> Result<()> {
    let logs = db.list_logs(limit)?;
    if logs.is_empty() {
        writeln!(writer, "No sessions recorded.")?;
        return Ok(());
    }
    writeln!(writer, "{:>5}  {:<19}  {:<19}  {}", "ID", "Start", "End", "Duration")?;
    for log in logs {
        writeln!(
            writer,
            "{:>5}  {:<19}  {:<19}  {}",
            log.id,
            log.start.format("%Y-%m-%d %H:%M:%S"),
            log.end.format("%Y-%m-%d %H:%M:%S"),
            hms(log.duration_seconds as f64)
        )?;
    }
    Ok(())
}

pub fn add<W: Write>(writer: &mut W, db: &Database, date: NaiveDate, minutes: i64) -> Result<()> {
    let session = NewSession::manual(date, minutes)?;
    let id = db.insert_log(&session)?;
    tracing::debug!(id, %date, minutes, "manual session added");
    writeln!(writer, "Added {minutes} minutes on {date} (session {id}).")?;
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
pub fn deduct<W: Write>(writer: &mut W, db: &mut Database, date: NaiveDate, minutes: i64) -> Result<()> {
    if minutes <= 0 {
        return Err(ValidationError::NonPositiveMinutes { minutes }.into());
    }
    match db.deduct_on_date(date, minutes * 60)? {
        Deduction::NoSessions => {
            writeln!(writer, "No sessions on {date}; nothing to deduct.")?;
        }
        Deduction::Applied { deleted, shrunk_to } => {
            write!(writer, "Deducted {minutes} minutes from {date}:")?;
            if deleted > 0 {
                write!(writer, " {deleted} session(s) deleted")?;
            }
            if let Some(new_duration) = shrunk_to {
                if deleted > 0 {
                    write!(writer, ",")?;
                }
                write!(writer, " one shrunk to {}", hms(new_duration as f64))?;
            }
            writeln!(writer, ".")?;
        }
    }
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
pub fn edit<W: Write>(writer: &mut W, db: &Database, id: i64, minutes: i64) -> Result<()> {
    match db.adjust_log(id, minutes * 60)? {
        Adjustment::NotFound => writeln!(writer, "No session with ID {id}.")?,
        Adjustment::Deleted => writeln!(writer, "Session {id} deleted (duration reached zero).")?,
        Adjustment::Updated { new_duration } => {
            writeln!(writer, "Session {id} updated to {}.", hms(new_duration as f64))?;
        }
    }
    Ok(())
}

pub fn delete<W: Write>(writer: &mut W, db: &Database, id: i64) -> Result<()> {
    if db.delete_log(id)? {
        writeln!(writer, "Session {id} deleted.")?;
    } else {
        writeln!(writer, "No session with ID {id}.")?;
    }
    Ok(())
}
