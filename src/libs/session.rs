//! The timer session state machine.
//!
//! A [`Session`] is the single record of what the user is doing right now:
//! idle, working on a task, paused, or on a break. Phases are a tagged union
//! so that contradictory combinations (paused *and* on break, running without
//! a start instant) cannot be represented.
//!
//! Transitions here are pure: they take the current instant and return what
//! happened (a finalized log, a finished break) so that the caller can talk
//! to the store. Nothing in this module performs I/O.

use crate::libs::remote::{LogId, TaskId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Milliseconds between two instants, clamped at zero.
pub(crate) fn ms_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_milliseconds().max(0)
}

/// Accounting for the task the session is tracking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveTask {
    pub task_id: TaskId,
    /// Open remote log; absent when opening it failed.
    pub log_id: Option<LogId>,
    /// Active milliseconds from completed intervals of this log.
    pub elapsed_ms: i64,
    /// Paused milliseconds from completed pauses of this log.
    pub paused_ms: i64,
}

impl ActiveTask {
    pub fn new(task_id: impl Into<TaskId>, log_id: Option<LogId>) -> Self {
        ActiveTask {
            task_id: task_id.into(),
            log_id,
            elapsed_ms: 0,
            paused_ms: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Working {
        task: ActiveTask,
        started_at: DateTime<Utc>,
    },
    Paused {
        task: ActiveTask,
        pause_started_at: DateTime<Utc>,
    },
    /// On a break; the task is paused underneath since `pause_started_at`.
    OnBreak {
        task: ActiveTask,
        pause_started_at: DateTime<Utc>,
        break_started_at: DateTime<Utc>,
        /// Effective length of this break, including extensions.
        break_duration_ms: i64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Status {
    Idle,
    Working,
    Paused,
    OnBreak,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Status::Idle => "Idle",
            Status::Working => "Working",
            Status::Paused => "Paused",
            Status::OnBreak => "Break",
        };
        write!(f, "{}", label)
    }
}

/// Final accounting of a time log at the moment it is closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogTotals {
    pub task_id: TaskId,
    pub log_id: Option<LogId>,
    pub elapsed_ms: i64,
    pub paused_ms: i64,
}

/// A break that just ended and should become a break log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinishedBreak {
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub duration_ms: i64,
}

impl FinishedBreak {
    fn new(started_at: DateTime<Utc>, ended_at: DateTime<Utc>) -> Self {
        FinishedBreak {
            started_at,
            ended_at,
            duration_ms: ms_between(started_at, ended_at),
        }
    }
}

/// Everything `stop` has to report to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stopped {
    pub totals: LogTotals,
    pub finished_break: Option<FinishedBreak>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    pub phase: Phase,
    /// Active milliseconds since the last break was started or skipped.
    pub work_ms_since_break: i64,
}

impl Session {
    pub fn idle() -> Self {
        Session::default()
    }

    pub fn status(&self) -> Status {
        match self.phase {
            Phase::Idle => Status::Idle,
            Phase::Working { .. } => Status::Working,
            Phase::Paused { .. } => Status::Paused,
            Phase::OnBreak { .. } => Status::OnBreak,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::Idle)
    }

    pub fn task(&self) -> Option<&ActiveTask> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Working { task, .. } | Phase::Paused { task, .. } | Phase::OnBreak { task, .. } => Some(task),
        }
    }

    pub fn active_task_id(&self) -> Option<&str> {
        self.task().map(|task| task.task_id.as_str())
    }

    pub fn current_log_id(&self) -> Option<&str> {
        self.task().and_then(|task| task.log_id.as_deref())
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        match self.phase {
            Phase::Working { started_at, .. } => Some(started_at),
            _ => None,
        }
    }

    pub fn pause_started_at(&self) -> Option<DateTime<Utc>> {
        match self.phase {
            Phase::Paused { pause_started_at, .. } | Phase::OnBreak { pause_started_at, .. } => Some(pause_started_at),
            _ => None,
        }
    }

    pub fn break_started_at(&self) -> Option<DateTime<Utc>> {
        match self.phase {
            Phase::OnBreak { break_started_at, .. } => Some(break_started_at),
            _ => None,
        }
    }

    /// Milliseconds of the interval that is running right now, if working.
    pub fn live_interval_ms(&self, now: DateTime<Utc>) -> i64 {
        self.started_at().map_or(0, |started_at| ms_between(started_at, now))
    }

    /// Active milliseconds of the current log, including a running interval.
    pub fn total_elapsed_ms(&self, now: DateTime<Utc>) -> i64 {
        self.task().map_or(0, |task| task.elapsed_ms + self.live_interval_ms(now))
    }

    /// Totals for the current log as if it were closed at `now`.
    pub fn totals(&self, now: DateTime<Utc>) -> Option<LogTotals> {
        let task = self.task()?;
        let running_pause = self.pause_started_at().map_or(0, |since| ms_between(since, now));

        Some(LogTotals {
            task_id: task.task_id.clone(),
            log_id: task.log_id.clone(),
            elapsed_ms: task.elapsed_ms + self.live_interval_ms(now),
            paused_ms: task.paused_ms + running_pause,
        })
    }

    /// Starts working on a new log. Cadence accounting carries over.
    pub fn begin(&mut self, task_id: impl Into<TaskId>, log_id: Option<LogId>, now: DateTime<Utc>) {
        self.phase = Phase::Working {
            task: ActiveTask::new(task_id, log_id),
            started_at: now,
        };
    }

    /// Adopts a log opened elsewhere as the running session.
    pub fn adopt(&mut self, task_id: impl Into<TaskId>, log_id: LogId, started_at: DateTime<Utc>, paused_ms: i64) {
        let mut task = ActiveTask::new(task_id, Some(log_id));
        task.paused_ms = paused_ms;
        self.phase = Phase::Working { task, started_at };
    }

    /// Working -> Paused. Returns `false` when not working.
    pub fn pause(&mut self, now: DateTime<Utc>) -> bool {
        let phase = std::mem::take(&mut self.phase);
        match phase {
            Phase::Working { mut task, started_at } => {
                let interval = ms_between(started_at, now);
                task.elapsed_ms += interval;
                self.work_ms_since_break += interval;
                self.phase = Phase::Paused {
                    task,
                    pause_started_at: now,
                };
                true
            }
            other => {
                self.phase = other;
                false
            }
        }
    }

    /// Paused -> Working. Returns `false` when not paused.
    pub fn resume(&mut self, now: DateTime<Utc>) -> bool {
        let phase = std::mem::take(&mut self.phase);
        match phase {
            Phase::Paused { mut task, pause_started_at } => {
                task.paused_ms += ms_between(pause_started_at, now);
                self.phase = Phase::Working { task, started_at: now };
                true
            }
            other => {
                self.phase = other;
                false
            }
        }
    }

    /// Ends the session and resets to the idle default.
    ///
    /// Returns the totals of the closed log and the break that was cut short,
    /// or `None` when there was nothing to stop.
    pub fn stop(&mut self, now: DateTime<Utc>) -> Option<Stopped> {
        let totals = self.totals(now);
        let finished_break = self.break_started_at().map(|since| FinishedBreak::new(since, now));
        *self = Session::idle();

        totals.map(|totals| Stopped { totals, finished_break })
    }

    /// Starts a break of `duration_ms`, pausing a running task first.
    ///
    /// Returns `false` when idle or already on a break.
    pub fn start_break(&mut self, duration_ms: i64, now: DateTime<Utc>) -> bool {
        if matches!(self.phase, Phase::Working { .. }) {
            self.pause(now);
        }

        let phase = std::mem::take(&mut self.phase);
        match phase {
            Phase::Paused { task, pause_started_at } => {
                self.work_ms_since_break = 0;
                self.phase = Phase::OnBreak {
                    task,
                    pause_started_at,
                    break_started_at: now,
                    break_duration_ms: duration_ms.max(0),
                };
                true
            }
            other => {
                self.phase = other;
                false
            }
        }
    }

    /// OnBreak -> Working, returning the finished break.
    ///
    /// The pause underneath the break is accounted into the log's paused time.
    pub fn resume_from_break(&mut self, now: DateTime<Utc>) -> Option<FinishedBreak> {
        let phase = std::mem::take(&mut self.phase);
        match phase {
            Phase::OnBreak {
                mut task,
                pause_started_at,
                break_started_at,
                ..
            } => {
                task.paused_ms += ms_between(pause_started_at, now);
                self.phase = Phase::Working { task, started_at: now };
                Some(FinishedBreak::new(break_started_at, now))
            }
            other => {
                self.phase = other;
                None
            }
        }
    }

    /// Lengthens the current break.
    ///
    /// With `additional_ms` the effective duration grows by that amount. Without
    /// it the deadline restarts from `now` with the break's current length.
    /// Either way the break keeps its original start.
    pub fn extend_break(&mut self, additional_ms: Option<i64>, now: DateTime<Utc>) -> bool {
        match &mut self.phase {
            Phase::OnBreak {
                break_started_at,
                break_duration_ms,
                ..
            } => {
                match additional_ms {
                    Some(extra) => *break_duration_ms += extra.max(0),
                    None => *break_duration_ms += ms_between(*break_started_at, now),
                }
                true
            }
            _ => false,
        }
    }

    /// Restarts the break cadence from `now` without taking a break.
    ///
    /// A running interval is banked into the log so that only work after the
    /// skip counts toward the next suggestion.
    pub fn skip_break(&mut self, now: DateTime<Utc>) {
        if let Phase::Working { task, started_at } = &mut self.phase {
            task.elapsed_ms += ms_between(*started_at, now);
            *started_at = now;
        }
        self.work_ms_since_break = 0;
    }

    /// Effective duration of the current break, if on one.
    pub fn break_duration_ms(&self) -> Option<i64> {
        match self.phase {
            Phase::OnBreak { break_duration_ms, .. } => Some(break_duration_ms),
            _ => None,
        }
    }
}
