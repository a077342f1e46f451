//! Core domain logic for the study tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Records: study session intervals and validated manual entries
//! - Statistics: streaks, averages, and consistency over the full log
//! - Heatmap: yearly contribution-graph aggregation
//! - Timer: the Idle/Running toggle state machine
//!
//! Everything here is pure computation; persistence lives in `st-db`.

mod format;
pub mod heatmap;
mod record;
pub mod stats;
pub mod timer;

pub use format::hms;
pub use heatmap::{HeatCell, HeatTier, Heatmap, daily_summary};
pub use record::{LogRecord, NewSession, ValidationError};
pub use stats::StatsSnapshot;
pub use timer::{StudyTimer, TimerState, Toggle};
