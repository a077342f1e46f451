//! Study statistics engine.
//!
//! Computes the full dashboard snapshot (totals, averages, streaks, busiest
//! day, consistency) from the complete set of log records. The engine is a
//! pure function of its input: no I/O, no caching, and empty input is a
//! valid case producing an all-zero snapshot.

use std::collections::{BTreeSet, HashSet};

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::LogRecord;

/// Weekday names indexed by days-from-Sunday, matching the dashboard.
const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Aggregate statistics over the full study log.
///
/// Durations are in seconds; averages are fractional seconds and formatted
/// with [`crate::hms`] for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub total_sec: i64,
    pub today_sec: i64,
    pub week_sec: i64,
    pub month_sec: i64,
    pub daily_avg: f64,
    pub weekly_avg: f64,
    pub monthly_avg: f64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_study_days: usize,
    pub avg_session_duration: f64,
    pub busiest_day: String,
    pub consistency_percent: f64,
}

impl StatsSnapshot {
    /// The snapshot for an empty log.
    pub fn empty() -> Self {
        Self {
            total_sec: 0,
            today_sec: 0,
            week_sec: 0,
            month_sec: 0,
            daily_avg: 0.0,
            weekly_avg: 0.0,
            monthly_avg: 0.0,
            current_streak: 0,
            longest_streak: 0,
            total_study_days: 0,
            avg_session_duration: 0.0,
            busiest_day: "N/A".to_string(),
            consistency_percent: 0.0,
        }
    }

    /// Computes the snapshot for `records` as of the given local date.
    ///
    /// `today` is passed in rather than read from the clock so callers (and
    /// tests) control the reference point for streaks and period sums.
    #[allow(clippy::cast_precision_loss)]
    pub fn compute(records: &[LogRecord], today: NaiveDate) -> Self {
        if records.is_empty() {
            return Self::empty();
        }

        let total_sec: i64 = records.iter().map(|r| r.duration_seconds).sum();

        let week_start = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
        let month_start = today.with_day(1).unwrap();

        let mut today_sec = 0;
        let mut week_sec = 0;
        let mut month_sec = 0;
        let mut by_weekday = [0_i64; 7];
        for record in records {
            let date = record.date();
            if date == today {
                today_sec += record.duration_seconds;
            }
            if date >= week_start {
                week_sec += record.duration_seconds;
            }
            if date >= month_start {
                month_sec += record.duration_seconds;
            }
            by_weekday[date.weekday().num_days_from_sunday() as usize] += record.duration_seconds;
        }

        // Sorted distinct study dates drive averages and streaks.
        let dates: BTreeSet<NaiveDate> = records.iter().map(LogRecord::date).collect();
        let weeks: HashSet<(i32, u32)> = dates
            .iter()
            .map(|d| {
                let week = d.iso_week();
                (week.year(), week.week())
            })
            .collect();
        let months: HashSet<(i32, u32)> = dates.iter().map(|d| (d.year(), d.month())).collect();

        let daily_avg = total_sec as f64 / dates.len() as f64;
        let weekly_avg = total_sec as f64 / weeks.len() as f64;
        let monthly_avg = total_sec as f64 / months.len() as f64;

        let seq: Vec<NaiveDate> = dates.iter().copied().collect();
        let (current_streak, longest_streak) = streaks(&seq, today);

        let busiest = by_weekday
            .iter()
            .enumerate()
            .max_by_key(|&(index, total)| (total, std::cmp::Reverse(index)))
            .map_or("N/A", |(index, _)| WEEKDAY_NAMES[index]);

        let first = seq[0];
        let span_days = (today - first).num_days() + 1;
        let consistency_percent = if span_days <= 0 {
            0.0
        } else {
            round2(100.0 * seq.len() as f64 / span_days as f64)
        };

        Self {
            total_sec,
            today_sec,
            week_sec,
            month_sec,
            daily_avg,
            weekly_avg,
            monthly_avg,
            current_streak,
            longest_streak,
            total_study_days: seq.len(),
            avg_session_duration: total_sec as f64 / records.len() as f64,
            busiest_day: busiest.to_string(),
            consistency_percent,
        }
    }
}

/// Computes (current, longest) streaks over sorted distinct dates.
///
/// The current streak is 0 unless the most recent studied date is today or
/// yesterday; when it qualifies, the trailing run of consecutive dates is
/// counted inclusively. The longest streak is the longest consecutive run
/// anywhere in the sequence, defaulting to 1 for any nonempty input.
fn streaks(seq: &[NaiveDate], today: NaiveDate) -> (u32, u32) {
    let Some(&last) = seq.last() else {
        return (0, 0);
    };

    let one_day = Duration::days(1);
    let mut current = 0;
    if last == today || last == today - one_day {
        current = 1;
        for pair in seq.windows(2).rev() {
            if pair[1] - pair[0] == one_day {
                current += 1;
            } else {
                break;
            }
        }
    }

    let mut longest = 1;
    let mut run = 1;
    for pair in seq.windows(2) {
        if pair[1] - pair[0] == one_day {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 1;
        }
    }

    (current, longest)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDateTime;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn record(id: i64, start: &str, duration_seconds: i64) -> LogRecord {
        let start: NaiveDateTime = start.parse().unwrap();
        LogRecord {
            id,
            start,
            end: start + Duration::seconds(duration_seconds),
            duration_seconds,
        }
    }

    #[test]
    fn empty_log_yields_all_zero_snapshot() {
        let snapshot = StatsSnapshot::compute(&[], date("2024-06-15"));
        assert_eq!(snapshot, StatsSnapshot::empty());
        assert_eq!(snapshot.busiest_day, "N/A");
        assert_eq!(snapshot.current_streak, 0);
        assert_eq!(snapshot.longest_streak, 0);
    }

    #[test]
    fn total_is_order_independent() {
        let mut records = vec![
            record(1, "2024-06-10T09:00:00", 600),
            record(2, "2024-06-12T09:00:00", 1200),
            record(3, "2024-06-11T09:00:00", 300),
        ];
        let forward = StatsSnapshot::compute(&records, date("2024-06-15"));
        records.reverse();
        let backward = StatsSnapshot::compute(&records, date("2024-06-15"));
        assert_eq!(forward.total_sec, 2100);
        assert_eq!(backward.total_sec, 2100);
    }

    #[test]
    fn duration_is_authoritative_over_interval() {
        // Manual edits can leave end out of sync with start + duration.
        let mut desynced = record(1, "2024-06-10T09:00:00", 600);
        desynced.duration_seconds = 900;
        let snapshot = StatsSnapshot::compute(&[desynced], date("2024-06-10"));
        assert_eq!(snapshot.total_sec, 900);
        assert_eq!(snapshot.today_sec, 900);
    }

    #[test]
    fn period_sums_bucket_by_start_date() {
        // 2024-06-15 is a Saturday; that week started Monday 2024-06-10.
        let today = date("2024-06-15");
        let records = vec![
            record(1, "2024-06-15T08:00:00", 100),
            record(2, "2024-06-10T08:00:00", 200),
            record(3, "2024-06-09T08:00:00", 400), // previous week, same month
            record(4, "2024-05-31T08:00:00", 800), // previous month
        ];
        let snapshot = StatsSnapshot::compute(&records, today);
        assert_eq!(snapshot.today_sec, 100);
        assert_eq!(snapshot.week_sec, 300);
        assert_eq!(snapshot.month_sec, 700);
        assert_eq!(snapshot.total_sec, 1500);
    }

    #[test]
    fn streak_run_with_gap() {
        // D, D+1, D+2, gap, D+4.
        let records = vec![
            record(1, "2024-06-01T08:00:00", 60),
            record(2, "2024-06-02T08:00:00", 60),
            record(3, "2024-06-03T08:00:00", 60),
            record(4, "2024-06-05T08:00:00", 60),
        ];

        let stale = StatsSnapshot::compute(&records, date("2024-06-10"));
        assert_eq!(stale.longest_streak, 3);
        assert_eq!(stale.current_streak, 0);

        // Today == D+4: the trailing run is just D+4.
        let fresh = StatsSnapshot::compute(&records, date("2024-06-05"));
        assert_eq!(fresh.current_streak, 1);

        // Today == D+5: D+4 was yesterday, still counts.
        let yesterday = StatsSnapshot::compute(&records, date("2024-06-06"));
        assert_eq!(yesterday.current_streak, 1);
    }

    #[test]
    fn current_streak_counts_trailing_run() {
        let records = vec![
            record(1, "2024-06-12T08:00:00", 60),
            record(2, "2024-06-13T08:00:00", 60),
            record(3, "2024-06-14T08:00:00", 60),
        ];
        let snapshot = StatsSnapshot::compute(&records, date("2024-06-14"));
        assert_eq!(snapshot.current_streak, 3);
        assert_eq!(snapshot.longest_streak, 3);
    }

    #[test]
    fn multiple_records_on_one_day_count_once_for_streaks() {
        let records = vec![
            record(1, "2024-06-14T08:00:00", 60),
            record(2, "2024-06-14T20:00:00", 60),
        ];
        let snapshot = StatsSnapshot::compute(&records, date("2024-06-14"));
        assert_eq!(snapshot.current_streak, 1);
        assert_eq!(snapshot.longest_streak, 1);
        assert_eq!(snapshot.total_study_days, 1);
    }

    #[test]
    fn averages_divide_by_distinct_buckets() {
        let records = vec![
            record(1, "2024-06-10T08:00:00", 600),
            record(2, "2024-06-10T20:00:00", 600),
            record(3, "2024-06-17T08:00:00", 600), // next ISO week
        ];
        let snapshot = StatsSnapshot::compute(&records, date("2024-06-17"));
        assert!((snapshot.daily_avg - 900.0).abs() < f64::EPSILON);
        assert!((snapshot.weekly_avg - 900.0).abs() < f64::EPSILON);
        assert!((snapshot.monthly_avg - 1800.0).abs() < f64::EPSILON);
        assert!((snapshot.avg_session_duration - 600.0).abs() < f64::EPSILON);
    }

    #[test]
    fn busiest_day_sums_across_weeks() {
        // Three Mondays at an hour each, one Tuesday at an hour.
        let records = vec![
            record(1, "2024-06-03T08:00:00", 3600),
            record(2, "2024-06-10T08:00:00", 3600),
            record(3, "2024-06-17T08:00:00", 3600),
            record(4, "2024-06-18T08:00:00", 3600),
        ];
        let snapshot = StatsSnapshot::compute(&records, date("2024-06-20"));
        assert_eq!(snapshot.busiest_day, "Monday");
    }

    #[test]
    fn consistency_spans_first_date_through_today() {
        // Studied 2 of the 10 days in the span.
        let records = vec![
            record(1, "2024-06-01T08:00:00", 60),
            record(2, "2024-06-05T08:00:00", 60),
        ];
        let snapshot = StatsSnapshot::compute(&records, date("2024-06-10"));
        assert!((snapshot.consistency_percent - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn consistency_rounds_to_two_decimals() {
        // 1 studied day over a 3-day span: 33.333... -> 33.33.
        let records = vec![record(1, "2024-06-01T08:00:00", 60)];
        let snapshot = StatsSnapshot::compute(&records, date("2024-06-03"));
        assert!((snapshot.consistency_percent - 33.33).abs() < f64::EPSILON);
    }
}
