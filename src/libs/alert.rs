//! Audible alert that accompanies visible prompts.

use chrono::{DateTime, Duration, Utc};
use std::io::Write;

/// Something that can make the user look up.
pub trait AlertSink: Send {
    fn play(&self);
}

/// Rings the terminal bell.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalBell;

impl AlertSink for TerminalBell {
    fn play(&self) {
        let mut stdout = std::io::stdout();
        if let Err(e) = stdout.write_all(b"\x07").and_then(|_| stdout.flush()) {
            tracing::debug!(error = %e, "failed to ring terminal bell");
        }
    }
}

/// Decides when the alert sounds.
///
/// The alert plays as soon as any prompt is visible. With repeat enabled it
/// plays again every `interval` while prompts stay visible, and the cycle
/// ends once all prompts are gone.
#[derive(Debug, Clone)]
pub struct AlertLoop {
    repeat: bool,
    interval: Duration,
    last_played: Option<DateTime<Utc>>,
}

impl AlertLoop {
    pub fn new(repeat: bool, interval_secs: u64) -> Self {
        let secs = i64::try_from(interval_secs.max(1)).unwrap_or(i64::MAX / 1000);
        AlertLoop {
            repeat,
            interval: Duration::seconds(secs),
            last_played: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.last_played.is_some()
    }

    /// Returns `true` when the alert should play at `now`.
    pub fn update(&mut self, any_visible: bool, now: DateTime<Utc>) -> bool {
        if !any_visible {
            self.last_played = None;
            return false;
        }

        let due = match self.last_played {
            None => true,
            Some(last) => self.repeat && now - last >= self.interval,
        };
        if due {
            self.last_played = Some(now);
        }
        due
    }
}

impl Default for AlertLoop {
    fn default() -> Self {
        AlertLoop::new(false, 5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_repeats_while_visible() {
        let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut alert = AlertLoop::new(true, 5);

        assert!(alert.update(true, t0));
        assert!(!alert.update(true, t0 + Duration::seconds(4)));
        assert!(alert.update(true, t0 + Duration::seconds(5)));
        assert!(!alert.update(false, t0 + Duration::seconds(11)));
        assert!(!alert.is_active());
    }

    #[test]
    fn test_single_shot_without_repeat() {
        let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut alert = AlertLoop::new(false, 5);

        assert!(alert.update(true, t0));
        assert!(!alert.update(true, t0 + Duration::minutes(5)));
    }
}
