//! Study session records.
//!
//! Timestamps are timezone-naive local datetimes, serialized as ISO 8601
//! without an offset (e.g., `2024-01-15T10:30:00`). `end = start +
//! duration_seconds` is expected but never enforced: manual edits can
//! desynchronize the two, and `duration_seconds` stays authoritative for
//! every total the statistics engine produces.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for user-supplied values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Manual add/deduct requires a positive minute count.
    #[error("minutes must be a positive integer, got {minutes}")]
    NonPositiveMinutes { minutes: i64 },
}

/// A persisted study session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub id: i64,
    #[serde(rename = "start_time")]
    pub start: NaiveDateTime,
    #[serde(rename = "end_time")]
    pub end: NaiveDateTime,
    pub duration_seconds: i64,
}

impl LogRecord {
    /// The calendar date this session is attributed to.
    ///
    /// Bucketing always uses the start date, even for sessions that cross
    /// midnight.
    pub const fn date(&self) -> NaiveDate {
        self.start.date()
    }
}

/// A session that has not been assigned an ID yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub duration_seconds: i64,
}

impl NewSession {
    /// Builds a session from a timed interval.
    ///
    /// Duration is the whole-second count between the endpoints, truncated.
    pub fn from_interval(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start,
            end,
            duration_seconds: (end - start).num_seconds(),
        }
    }

    /// Synthesizes a manual entry: `minutes` of study anchored at midnight
    /// of the given date.
    pub fn manual(date: NaiveDate, minutes: i64) -> Result<Self, ValidationError> {
        if minutes <= 0 {
            return Err(ValidationError::NonPositiveMinutes { minutes });
        }
        let seconds = minutes * 60;
        let start = date.and_time(NaiveTime::MIN);
        Ok(Self {
            start,
            end: start + Duration::seconds(seconds),
            duration_seconds: seconds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        s.parse().unwrap()
    }

    #[test]
    fn interval_duration_truncates_to_whole_seconds() {
        let session = NewSession::from_interval(dt("2024-01-01T10:00:00"), dt("2024-01-01T10:25:30"));
        assert_eq!(session.duration_seconds, 25 * 60 + 30);
    }

    #[test]
    fn manual_entry_anchors_at_midnight() {
        let session = NewSession::manual(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(), 45).unwrap();
        assert_eq!(session.start, dt("2024-03-05T00:00:00"));
        assert_eq!(session.end, dt("2024-03-05T00:45:00"));
        assert_eq!(session.duration_seconds, 2700);
    }

    #[test]
    fn manual_entry_rejects_non_positive_minutes() {
        let err = NewSession::manual(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(), 0).unwrap_err();
        assert_eq!(err, ValidationError::NonPositiveMinutes { minutes: 0 });
        assert!(NewSession::manual(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(), -10).is_err());
    }

    #[test]
    fn record_serializes_with_storage_keys() {
        let record = LogRecord {
            id: 7,
            start: dt("2024-01-01T00:00:00"),
            end: dt("2024-01-01T01:00:00"),
            duration_seconds: 3600,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["start_time"], "2024-01-01T00:00:00");
        assert_eq!(json["end_time"], "2024-01-01T01:00:00");
        assert_eq!(json["duration_seconds"], 3600);
        assert_eq!(json["id"], 7);
    }
}
