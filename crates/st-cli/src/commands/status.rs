//! Status command for a quick tracking summary.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use chrono::Local;

use st_core::{StatsSnapshot, hms};
use st_db::Database;

#[allow(clippy::cast_precision_loss)]
pub fn run<W: Write>(writer: &mut W, db: &Database, database_path: &Path) -> Result<()> {
    let logs = db.list_logs(0)?;
    let snapshot = StatsSnapshot::compute(&logs, Local::now().date_naive());

    writeln!(writer, "Study tracker status")?;
    writeln!(writer, "Database: {}", database_path.display())?;

    if logs.is_empty() {
        writeln!(writer, "No sessions recorded.")?;
        return Ok(());
    }

    writeln!(writer, "Today: {}", hms(snapshot.today_sec as f64))?;
    writeln!(writer, "Current streak: {} 🔥", snapshot.current_streak)?;
    // list_logs is newest-first.
    let last = &logs[0];
    writeln!(
        writer,
        "Last session: {} ({})",
        last.start.format("%Y-%m-%d %H:%M:%S"),
        hms(last.duration_seconds as f64)
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Duration;
    use st_core::NewSession;

    #[test]
    fn status_reports_last_session() {
        let temp = tempfile::tempdir().unwrap();
        let db_path = temp.path().join("study.db");
        let db = Database::open(&db_path).unwrap();
        let start: chrono::NaiveDateTime = "2024-06-01T10:00:00".parse().unwrap();
        db.insert_log(&NewSession {
            start,
            end: start + Duration::seconds(1800),
            duration_seconds: 1800,
        })
        .unwrap();

        let mut output = Vec::new();
        run(&mut output, &db, &db_path).unwrap();
        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("Last session: 2024-06-01 10:00:00 (00:30:00)"));
    }

    #[test]
    fn status_with_empty_log() {
        let db = Database::open_in_memory().unwrap();
        let mut output = Vec::new();
        run(&mut output, &db, Path::new("study.db")).unwrap();
        assert!(String::from_utf8(output).unwrap().contains("No sessions recorded."));
    }
}
