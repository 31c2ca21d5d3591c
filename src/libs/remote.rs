//! Contract between the timer and the durable session store.
//!
//! The timer treats the store as remote: every call is async, may fail, and
//! is never allowed to block a local state transition. The store also
//! publishes a live feed of time-log row changes so that several running
//! instances for the same user converge on one active session. The feed only
//! reaches instances sharing the store value; instances in other processes
//! are caught up by polling [`SessionStore::fetch_open_log`] and
//! [`SessionStore::fetch_log`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

pub type UserId = String;
pub type TaskId = String;
pub type LogId = String;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("time log {0} not found")]
    LogNotFound(LogId),
    #[error("time log {0} is already closed")]
    LogClosed(LogId),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// One row of the `time_logs` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeLog {
    pub id: LogId,
    pub user_id: UserId,
    pub task_id: TaskId,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    /// Active seconds, set when the log is closed.
    pub duration_actual: Option<i64>,
    /// Seconds beyond the task estimate; absent when zero.
    pub overtime_duration: Option<i64>,
    pub paused_ms: i64,
}

impl TimeLog {
    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }
}

/// The subset of an open time log needed to adopt it as the active session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenLog {
    pub id: LogId,
    pub task_id: TaskId,
    pub started_at: DateTime<Utc>,
    pub paused_ms: i64,
}

impl From<&TimeLog> for OpenLog {
    fn from(row: &TimeLog) -> Self {
        OpenLog {
            id: row.id.clone(),
            task_id: row.task_id.clone(),
            started_at: row.started_at,
            paused_ms: row.paused_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakLog {
    pub id: String,
    pub user_id: UserId,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub duration_ms: i64,
}

/// Per-user break cadence and nag thresholds, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakSettings {
    /// Minutes of work between break suggestions; 0 disables them.
    pub break_every_mins: u32,
    /// Default break length.
    pub break_duration_mins: u32,
    /// Minutes paused before the long-pause nag; 0 disables it.
    pub long_pause_mins: u32,
}

impl Default for BreakSettings {
    fn default() -> Self {
        BreakSettings {
            break_every_mins: 50,
            break_duration_mins: 10,
            long_pause_mins: 10,
        }
    }
}

impl BreakSettings {
    pub fn break_every_ms(&self) -> i64 {
        i64::from(self.break_every_mins) * 60_000
    }

    pub fn break_duration_ms(&self) -> i64 {
        i64::from(self.break_duration_mins) * 60_000
    }

    pub fn long_pause_ms(&self) -> i64 {
        i64::from(self.long_pause_mins) * 60_000
    }

    /// Applies the fields present in `update`, leaving the rest unchanged.
    pub fn apply(&mut self, update: &BreakSettingsUpdate) {
        if let Some(every) = update.break_every_mins {
            self.break_every_mins = every;
        }
        if let Some(duration) = update.break_duration_mins {
            self.break_duration_mins = duration;
        }
        if let Some(long_pause) = update.long_pause_mins {
            self.long_pause_mins = long_pause;
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakSettingsUpdate {
    pub break_every_mins: Option<u32>,
    pub break_duration_mins: Option<u32>,
    pub long_pause_mins: Option<u32>,
}

impl BreakSettingsUpdate {
    pub fn is_empty(&self) -> bool {
        self.break_every_mins.is_none() && self.break_duration_mins.is_none() && self.long_pause_mins.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Insert,
    Update,
}

/// A live-feed notification about one time-log row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogChange {
    pub kind: ChangeKind,
    pub row: TimeLog,
}

/// Subscription to time-log changes for a single user.
pub struct LogFeed {
    user_id: UserId,
    rx: broadcast::Receiver<LogChange>,
}

impl LogFeed {
    pub fn new(user_id: impl Into<UserId>, rx: broadcast::Receiver<LogChange>) -> Self {
        LogFeed { user_id: user_id.into(), rx }
    }

    /// Waits for the next change that belongs to this feed's user.
    ///
    /// Returns `None` once the publishing store is gone. A lagging receiver
    /// skips the dropped events and keeps listening.
    pub async fn recv(&mut self) -> Option<LogChange> {
        loop {
            match self.rx.recv().await {
                Ok(change) if change.row.user_id == self.user_id => return Some(change),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "live feed lagged; dropped time-log notifications");
                    continue;
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Returns the next pending change without waiting.
    pub fn try_next(&mut self) -> Option<LogChange> {
        loop {
            match self.rx.try_recv() {
                Ok(change) if change.row.user_id == self.user_id => return Some(change),
                Ok(_) => continue,
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "live feed lagged; dropped time-log notifications");
                    continue;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }
}

/// Durable store for time logs, break logs and break settings.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Opens a new time log and returns its id.
    async fn start_log(&self, user_id: &str, task_id: &str, started_at: DateTime<Utc>) -> Result<LogId, StoreError>;

    /// Closes a time log with its final accounting.
    ///
    /// A log that is already closed keeps its accounting and the call fails
    /// with [`StoreError::LogClosed`].
    async fn stop_log(
        &self,
        log_id: &str,
        ended_at: DateTime<Utc>,
        duration_secs: i64,
        paused_ms: i64,
        overtime_secs: i64,
    ) -> Result<(), StoreError>;

    async fn create_break_log(
        &self,
        user_id: &str,
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
        duration_ms: i64,
    ) -> Result<(), StoreError>;

    /// The user's open time log, if any.
    async fn fetch_open_log(&self, user_id: &str) -> Result<Option<OpenLog>, StoreError>;

    async fn fetch_log(&self, log_id: &str) -> Result<Option<TimeLog>, StoreError>;

    async fn fetch_break_settings(&self, user_id: &str) -> Result<Option<BreakSettings>, StoreError>;

    /// Estimated duration of a task in seconds; `None` for unknown tasks.
    async fn fetch_task_estimate(&self, task_id: &str) -> Result<Option<i64>, StoreError>;

    /// Sum of `duration_actual + overtime_duration` over the task's closed logs.
    async fn prior_logged_seconds(&self, task_id: &str) -> Result<i64, StoreError>;

    /// Subscribes to time-log changes for `user_id`.
    fn subscribe(&self, user_id: &str) -> LogFeed;
}
