//! OBS overlay payload.
//!
//! The browser source expects one JSON object per second with these exact
//! camelCase keys; durations are preformatted `HH:MM:SS` strings and the
//! streak carries its flame suffix so the overlay renders text verbatim.

use serde::{Deserialize, Serialize};

use st_core::hms;

/// One overlay tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayPayload {
    pub session_time: String,
    pub today_time: String,
    pub streak: String,
    pub is_timer_running: bool,
}

impl OverlayPayload {
    /// Builds the payload from a sampled snapshot.
    ///
    /// `today_sec` excludes the open session; the live elapsed seconds are
    /// folded into the today total here.
    #[allow(clippy::cast_precision_loss)]
    pub fn new(session_elapsed: i64, today_sec: i64, current_streak: u32, running: bool) -> Self {
        Self {
            session_time: hms(session_elapsed as f64),
            today_time: hms((today_sec + session_elapsed) as f64),
            streak: format!("{current_streak} 🔥"),
            is_timer_running: running,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_serializes_with_exact_keys() {
        let payload = OverlayPayload::new(90, 3600, 4, true);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["sessionTime"], "00:01:30");
        assert_eq!(json["todayTime"], "01:01:30");
        assert_eq!(json["streak"], "4 🔥");
        assert_eq!(json["isTimerRunning"], true);
        // No other keys.
        assert_eq!(json.as_object().unwrap().len(), 4);
    }

    #[test]
    fn idle_payload_has_zero_session_time() {
        let payload = OverlayPayload::new(0, 1200, 0, false);
        assert_eq!(payload.session_time, "00:00:00");
        assert_eq!(payload.today_time, "00:20:00");
        assert!(!payload.is_timer_running);
    }
}
