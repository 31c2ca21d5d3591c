//! Derived display values for timer consumers.

use crate::libs::formatter::format_hms;
use crate::libs::remote::TaskId;
use crate::libs::session::{ms_between, Phase, Session, Status};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// What the timer knows about the active task beyond the session itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskMeta {
    pub task_id: TaskId,
    /// Estimated duration in seconds; 0 when the task has no estimate.
    pub estimate_secs: i64,
    /// Seconds already recorded by this task's closed logs.
    pub prior_logged_secs: i64,
}

impl TaskMeta {
    pub fn has_estimate(&self) -> bool {
        self.estimate_secs > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReadoutMode {
    Idle,
    /// Time left in the current break.
    BreakCountdown,
    /// Time left against the task estimate.
    TaskCountdown,
    /// Time worked on a task without an estimate.
    Stopwatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Readout {
    pub status: Status,
    pub mode: ReadoutMode,
    /// Signed milliseconds; negative once a countdown runs out.
    pub display_ms: i64,
}

impl Readout {
    pub fn text(&self) -> String {
        format_hms(self.display_ms)
    }
}

/// Computes the readout for `session` at `now`.
///
/// `meta` is ignored unless it describes the session's active task.
pub fn compute(session: &Session, meta: Option<&TaskMeta>, now: DateTime<Utc>) -> Readout {
    let status = session.status();

    let (mode, display_ms) = match &session.phase {
        Phase::Idle => (ReadoutMode::Idle, 0),
        Phase::OnBreak {
            break_started_at,
            break_duration_ms,
            ..
        } => (
            ReadoutMode::BreakCountdown,
            break_duration_ms - ms_between(*break_started_at, now),
        ),
        Phase::Working { task, .. } | Phase::Paused { task, .. } => {
            let worked_ms = session.total_elapsed_ms(now);
            match meta.filter(|meta| meta.task_id == task.task_id && meta.has_estimate()) {
                Some(meta) => (
                    ReadoutMode::TaskCountdown,
                    meta.estimate_secs * 1000 - (meta.prior_logged_secs * 1000 + worked_ms),
                ),
                None => (ReadoutMode::Stopwatch, worked_ms),
            }
        }
    };

    Readout {
        status,
        mode,
        display_ms,
    }
}
