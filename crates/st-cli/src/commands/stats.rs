//! Stats command for the full dashboard snapshot.

use std::io::Write;

use anyhow::Result;
use chrono::Local;

use st_core::{StatsSnapshot, hms};
use st_db::Database;

pub fn run<W: Write>(writer: &mut W, db: &Database, json: bool) -> Result<()> {
    let logs = db.list_logs(0)?;
    let snapshot = StatsSnapshot::compute(&logs, Local::now().date_naive());
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&snapshot)?)?;
    } else {
        render(writer, &snapshot)?;
    }
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn render<W: Write>(writer: &mut W, snapshot: &StatsSnapshot) -> Result<()> {
    writeln!(
        writer,
        "Current streak: {} 🔥   Longest streak: {}",
        snapshot.current_streak, snapshot.longest_streak
    )?;
    writeln!(
        writer,
        "Total studied:  {} over {} days",
        hms(snapshot.total_sec as f64),
        snapshot.total_study_days
    )?;
    writeln!(writer)?;
    writeln!(
        writer,
        "Today       {}   daily avg    {}",
        hms(snapshot.today_sec as f64),
        hms(snapshot.daily_avg)
    )?;
    writeln!(
        writer,
        "This week   {}   weekly avg   {}",
        hms(snapshot.week_sec as f64),
        hms(snapshot.weekly_avg)
    )?;
    writeln!(
        writer,
        "This month  {}   monthly avg  {}",
        hms(snapshot.month_sec as f64),
        hms(snapshot.monthly_avg)
    )?;
    writeln!(writer)?;
    writeln!(writer, "Busiest day:  {}", snapshot.busiest_day)?;
    writeln!(writer, "Avg session:  {}", hms(snapshot.avg_session_duration))?;
    writeln!(writer, "Consistency:  {:.2}%", snapshot.consistency_percent)?;
    Ok(())
}
