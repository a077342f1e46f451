//! Study timer state machine.
//!
//! A wall-clock toggle between `Idle` and `Running`. The machine holds no
//! thread and does no I/O: the caller provides `now` and persists the
//! session produced on stop. Running state is deliberately not persisted,
//! so an interrupted session at crash time is lost rather than recovered.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::NewSession;

/// Current timer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
}

/// Result of a toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toggle {
    /// The timer started; nothing is written yet.
    Started { at: NaiveDateTime },
    /// The timer stopped; the caller should persist the session.
    Stopped { session: NewSession },
}

/// The single-owner study timer.
#[derive(Debug, Clone, Default)]
pub struct StudyTimer {
    started_at: Option<NaiveDateTime>,
}

impl StudyTimer {
    pub const fn new() -> Self {
        Self { started_at: None }
    }

    pub const fn state(&self) -> TimerState {
        if self.started_at.is_some() {
            TimerState::Running
        } else {
            TimerState::Idle
        }
    }

    /// Seconds elapsed in the open session, 0 when idle.
    pub fn elapsed_seconds(&self, now: NaiveDateTime) -> i64 {
        self.started_at
            .map_or(0, |started| (now - started).num_seconds())
    }

    /// Flips the timer, producing a session on the Running -> Idle edge.
    pub fn toggle(&mut self, now: NaiveDateTime) -> Toggle {
        match self.started_at.take() {
            None => {
                self.started_at = Some(now);
                Toggle::Started { at: now }
            }
            Some(started) => Toggle::Stopped {
                session: NewSession::from_interval(started, now),
            },
        }
    }
}
