//! Duration formatting for timer readouts and history tables.
//!
//! Two formats are used across the application:
//!
//! - **Timer readout**: `HH:MM:SS`, signed. Negative values mean the task ran
//!   past its estimate or a break overran, e.g. `-00:01:40`.
//! - **History tables**: `HH:MM`, negative durations clamp to `00:00`.
//!
//! ## Examples
//!
//! ```rust
//! use timeblock::libs::formatter::{format_duration, format_hms};
//! use chrono::Duration;
//!
//! assert_eq!(format_hms(-100_000), "-00:01:40");
//! assert_eq!(format_hms(3_725_000), "01:02:05");
//! assert_eq!(format_duration(&Duration::minutes(90)), "01:30");
//! ```

use chrono::Duration;

/// Formats signed milliseconds as `HH:MM:SS`.
///
/// Partial seconds are dropped, so a countdown shows a second only once it
/// has fully passed. A value under one second either way prints without a
/// sign.
pub fn format_hms(ms: i64) -> String {
    let total_secs = ms.unsigned_abs() / 1000;
    let sign = if ms < 0 && total_secs > 0 { "-" } else { "" };
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    format!("{}{:02}:{:02}:{:02}", sign, hours, minutes, seconds)
}

/// Formats a duration as `HH:MM`, treating negative durations as zero.
pub fn format_duration(duration: &Duration) -> String {
    let total_minutes = duration.num_minutes().max(0);
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    format!("{:02}:{:02}", hours, minutes)
}

/// Rounds milliseconds to whole seconds, half-up, the way time logs store
/// their `duration_actual`.
pub fn ms_to_rounded_secs(ms: i64) -> i64 {
    if ms >= 0 {
        (ms + 500) / 1000
    } else {
        -((-ms + 500) / 1000)
    }
}
