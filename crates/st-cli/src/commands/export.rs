//! Export command: dump the full session log as JSON.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use st_db::Database;

pub fn run<W: Write>(writer: &mut W, db: &Database, output: Option<&Path>) -> Result<()> {
    let logs = db.list_logs(0)?;
    let json = serde_json::to_string_pretty(&logs)?;
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            writeln!(writer, "Exported {} sessions to {}.", logs.len(), path.display())?;
        }
        None => writeln!(writer, "{json}")?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{Duration, NaiveDateTime};
    use st_core::NewSession;

    fn session(start: &str, duration_seconds: i64) -> NewSession {
        let start: NaiveDateTime = start.parse().unwrap();
        NewSession {
            start,
            end: start + Duration::seconds(duration_seconds),
            duration_seconds,
        }
    }

    #[test]
    fn export_emits_storage_keys() {
        let db = Database::open_in_memory().unwrap();
        db.insert_log(&session("2024-01-01T00:00:00", 3600)).unwrap();

        let mut output = Vec::new();
        run(&mut output, &db, None).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&String::from_utf8(output).unwrap()).unwrap();
        let record = &parsed[0];
        assert_eq!(record["start_time"], "2024-01-01T00:00:00");
        assert_eq!(record["end_time"], "2024-01-01T01:00:00");
        assert_eq!(record["duration_seconds"], 3600);
        assert!(record["id"].is_i64());
    }

    #[test]
    fn export_to_file_reports_count() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("export.json");
        let db = Database::open_in_memory().unwrap();
        db.insert_log(&session("2024-01-01T00:00:00", 60)).unwrap();
        db.insert_log(&session("2024-01-02T00:00:00", 60)).unwrap();

        let mut output = Vec::new();
        run(&mut output, &db, Some(&path)).unwrap();

        assert!(String::from_utf8(output).unwrap().contains("2 sessions"));
        let contents = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);
    }
}
