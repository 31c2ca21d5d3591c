//! Local persistence of the timer session.
//!
//! The session is written after every state change as a flat camelCase JSON
//! record under one fixed name in the data directory, and read back on
//! startup. A missing or unreadable record means the session starts idle.

use crate::libs::data_storage::DataStorage;
use crate::libs::remote::{LogId, TaskId};
use crate::libs::session::{ActiveTask, Phase, Session};
use anyhow::Result;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

pub const SESSION_FILE_NAME: &str = "timeblock-timer-state.json";

/// Persisted wire form of a [`Session`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionRecord {
    pub active_task_id: Option<TaskId>,
    pub current_log_id: Option<LogId>,
    pub started_at: Option<DateTime<Utc>>,
    pub elapsed_ms: i64,
    pub is_paused: bool,
    pub pause_started_at: Option<DateTime<Utc>>,
    pub paused_ms: i64,
    pub work_ms_since_break: i64,
    pub is_on_break: bool,
    pub break_started_at: Option<DateTime<Utc>>,
    pub break_duration_ms: i64,
}

impl From<&Session> for SessionRecord {
    fn from(session: &Session) -> Self {
        let mut record = SessionRecord {
            work_ms_since_break: session.work_ms_since_break,
            ..SessionRecord::default()
        };

        match &session.phase {
            Phase::Idle => {}
            Phase::Working { task, started_at } => {
                record.fill_task(task);
                record.started_at = Some(*started_at);
            }
            Phase::Paused { task, pause_started_at } => {
                record.fill_task(task);
                record.is_paused = true;
                record.pause_started_at = Some(*pause_started_at);
            }
            Phase::OnBreak {
                task,
                pause_started_at,
                break_started_at,
                break_duration_ms,
            } => {
                record.fill_task(task);
                record.is_on_break = true;
                record.pause_started_at = Some(*pause_started_at);
                record.break_started_at = Some(*break_started_at);
                record.break_duration_ms = *break_duration_ms;
            }
        }

        record
    }
}

impl SessionRecord {
    fn fill_task(&mut self, task: &ActiveTask) {
        self.active_task_id = Some(task.task_id.clone());
        self.current_log_id = task.log_id.clone();
        self.elapsed_ms = task.elapsed_ms;
        self.paused_ms = task.paused_ms;
    }

    /// Rebuilds the session; `now` stands in for timestamps the record lacks.
    ///
    /// Break takes precedence over pause, and a record without an active task
    /// is idle whatever its other flags say.
    pub fn into_session(self, now: DateTime<Utc>) -> Session {
        let work_ms_since_break = self.work_ms_since_break.max(0);
        let Some(task_id) = self.active_task_id else {
            return Session {
                phase: Phase::Idle,
                work_ms_since_break,
            };
        };

        let task = ActiveTask {
            task_id,
            log_id: self.current_log_id,
            elapsed_ms: self.elapsed_ms.max(0),
            paused_ms: self.paused_ms.max(0),
        };

        let phase = if self.is_on_break {
            let break_started_at = self.break_started_at.unwrap_or(now);
            Phase::OnBreak {
                task,
                pause_started_at: self.pause_started_at.unwrap_or(break_started_at),
                break_started_at,
                break_duration_ms: self.break_duration_ms.max(0),
            }
        } else if self.is_paused {
            Phase::Paused {
                task,
                pause_started_at: self.pause_started_at.unwrap_or(now),
            }
        } else {
            Phase::Working {
                task,
                started_at: self.started_at.unwrap_or(now),
            }
        };

        Session {
            phase,
            work_ms_since_break,
        }
    }
}

/// Where the serialized session lives between runs.
pub trait SessionStorage: Send {
    /// Returns the stored record, `None` when nothing was stored yet.
    fn load(&self) -> Result<Option<SessionRecord>>;
    fn save(&self, record: &SessionRecord) -> Result<()>;
}

/// JSON file in the application data directory.
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new(data_storage: &DataStorage) -> Result<Self> {
        Ok(Self {
            path: data_storage.get_path(SESSION_FILE_NAME)?,
        })
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl SessionStorage for FileSessionStorage {
    fn load(&self) -> Result<Option<SessionRecord>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn save(&self, record: &SessionRecord) -> Result<()> {
        let raw = serde_json::to_string(record)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

/// In-process storage; clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStorage {
    raw: Arc<Mutex<Option<String>>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeds the slot with arbitrary text, valid JSON or not.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Arc::new(Mutex::new(Some(raw.into()))),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.raw.lock().clone()
    }
}

impl SessionStorage for MemorySessionStorage {
    fn load(&self) -> Result<Option<SessionRecord>> {
        match self.raw.lock().as_deref() {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    fn save(&self, record: &SessionRecord) -> Result<()> {
        *self.raw.lock() = Some(serde_json::to_string(record)?);
        Ok(())
    }
}
