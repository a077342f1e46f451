//! Yearly study heatmap.
//!
//! Aggregates seconds studied per calendar date and assigns each day one of
//! five color tiers, laid out as a GitHub-style contribution grid
//! (Monday-first: rows are weekdays, columns are weeks).

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::LogRecord;

/// Number of weekday rows in the grid.
pub const GRID_ROWS: usize = 7;

/// Color tier for a single heatmap day.
///
/// `Zero` is reserved for days with no recorded time; the rest are quartiles
/// of `(0, max]` for the displayed year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeatTier {
    Zero,
    Low,
    Mid,
    High,
    Top,
}

impl HeatTier {
    /// Buckets a day's seconds against the yearly maximum.
    #[allow(clippy::cast_precision_loss)]
    pub fn for_value(seconds: i64, max: i64) -> Self {
        if seconds == 0 {
            return Self::Zero;
        }
        let ratio = seconds as f64 / max as f64;
        if ratio < 0.25 {
            Self::Low
        } else if ratio < 0.50 {
            Self::Mid
        } else if ratio < 0.75 {
            Self::High
        } else {
            Self::Top
        }
    }
}

/// One rendered day of the heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeatCell {
    pub date: NaiveDate,
    pub seconds: i64,
    pub tier: HeatTier,
    /// Week column in the grid.
    pub col: usize,
    /// Weekday row in the grid (Monday = 0).
    pub row: usize,
}

/// Heatmap data for one calendar year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heatmap {
    pub year: i32,
    /// Yearly maximum seconds on a single day. Defaults to 1 for a year
    /// with no data so bucketing never divides by zero.
    pub max_seconds: i64,
    pub summary: BTreeMap<NaiveDate, i64>,
}

impl Heatmap {
    /// Builds the heatmap for `year` from a per-date summary.
    pub fn from_summary(year: i32, summary: BTreeMap<NaiveDate, i64>) -> Self {
        let max_seconds = summary.values().copied().max().filter(|&m| m > 0).unwrap_or(1);
        Self {
            year,
            max_seconds,
            summary,
        }
    }

    /// Builds the heatmap for `year` directly from log records.
    pub fn from_records(records: &[LogRecord], year: i32) -> Self {
        Self::from_summary(year, daily_summary(records, year))
    }

    /// Iterates every day of the year in calendar order with its grid slot.
    pub fn cells(&self) -> impl Iterator<Item = HeatCell> + '_ {
        let first_weekday = first_weekday_offset(self.year);
        (1..).map_while(move |day_of_year| {
            let date = NaiveDate::from_yo_opt(self.year, day_of_year)?;
            let seconds = self.summary.get(&date).copied().unwrap_or(0);
            let index = first_weekday + day_of_year as usize - 1;
            Some(HeatCell {
                date,
                seconds,
                tier: HeatTier::for_value(seconds, self.max_seconds),
                col: index / GRID_ROWS,
                row: index % GRID_ROWS,
            })
        })
    }
}

/// Sums seconds studied per calendar date, restricted to the given year.
pub fn daily_summary(records: &[LogRecord], year: i32) -> BTreeMap<NaiveDate, i64> {
    let mut summary = BTreeMap::new();
    for record in records {
        let date = record.date();
        if date.year() == year {
            *summary.entry(date).or_insert(0) += record.duration_seconds;
        }
    }
    summary
}

/// Days-from-Monday of January 1st, anchoring the grid layout.
fn first_weekday_offset(year: i32) -> usize {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .map_or(0, |d| d.weekday().num_days_from_monday() as usize)
}
