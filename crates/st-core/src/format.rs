//! Duration formatting.

/// Formats a second count as zero-padded `HH:MM:SS`.
///
/// Fractional input is rounded to the nearest whole second before splitting,
/// so `hms(59.6)` renders as `"00:01:00"`. Negative input is clamped to zero.
#[allow(clippy::cast_possible_truncation)]
pub fn hms(seconds: f64) -> String {
    let total = seconds.round().max(0.0) as i64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}
