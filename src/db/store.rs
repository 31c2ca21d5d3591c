//! SQLite implementation of the session store.
//!
//! One connection is shared behind a mutex by every timer instance that holds
//! a clone of the store. Writes to `time_logs` are published on a broadcast
//! channel, which plays the role of the live feed: instances subscribed for
//! the same user see each other's inserts and updates. Other processes open
//! their own connection to the same file and never see this channel; they
//! pick up each other's changes through [`SessionStore::fetch_open_log`] and
//! [`SessionStore::fetch_log`].

use crate::db::break_logs::BreakLogs;
use crate::db::break_settings::BreakSettingsRepo;
use crate::db::db::Db;
use crate::db::tasks::Tasks;
use crate::db::time_logs::TimeLogs;
use crate::libs::remote::{
    BreakLog, BreakSettings, ChangeKind, LogChange, LogFeed, LogId, OpenLog, SessionStore, StoreError, TimeLog,
};
use crate::libs::task::{Task, TaskFilter};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::Connection;
use std::sync::Arc;
use tokio::sync::broadcast;

const FEED_CAPACITY: usize = 64;

#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    feed: broadcast::Sender<LogChange>,
}

impl SqliteStore {
    pub fn new(db: Db) -> Self {
        let (feed, _) = broadcast::channel(FEED_CAPACITY);
        SqliteStore {
            conn: Arc::new(Mutex::new(db.conn)),
            feed,
        }
    }

    pub fn in_memory() -> anyhow::Result<Self> {
        Ok(Self::new(Db::in_memory()?))
    }

    fn publish(&self, kind: ChangeKind, row: TimeLog) {
        // No subscribers is fine.
        let _ = self.feed.send(LogChange { kind, row });
    }

    // Direct access used by the command line

    pub fn add_task(&self, task: &Task) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        Tasks::new(&conn).insert(task)?;
        Ok(())
    }

    pub fn tasks(&self, user_id: &str, filter: TaskFilter) -> Result<Vec<Task>, StoreError> {
        let conn = self.conn.lock();
        Ok(Tasks::new(&conn).fetch(user_id, filter)?)
    }

    pub fn finish_task(&self, task_id: &str) -> Result<bool, StoreError> {
        let conn = self.conn.lock();
        Ok(Tasks::new(&conn).set_finished(task_id, true)?)
    }

    pub fn recent_logs(&self, user_id: &str, limit: usize) -> Result<Vec<TimeLog>, StoreError> {
        let conn = self.conn.lock();
        Ok(TimeLogs::new(&conn).fetch_recent(user_id, limit)?)
    }

    pub fn recent_breaks(&self, user_id: &str, limit: usize) -> Result<Vec<BreakLog>, StoreError> {
        let conn = self.conn.lock();
        Ok(BreakLogs::new(&conn).fetch_recent(user_id, limit)?)
    }

    pub fn save_break_settings(&self, user_id: &str, settings: &BreakSettings) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        BreakSettingsRepo::new(&conn).save(user_id, settings)?;
        Ok(())
    }

    pub fn time_log(&self, log_id: &str) -> Result<Option<TimeLog>, StoreError> {
        let conn = self.conn.lock();
        Ok(TimeLogs::new(&conn).get(log_id)?)
    }
}

#[async_trait]
impl SessionStore for SqliteStore {
    async fn start_log(&self, user_id: &str, task_id: &str, started_at: DateTime<Utc>) -> Result<LogId, StoreError> {
        let row = {
            let conn = self.conn.lock();
            TimeLogs::new(&conn).open(user_id, task_id, started_at)?
        };
        let log_id = row.id.clone();
        self.publish(ChangeKind::Insert, row);

        Ok(log_id)
    }

    async fn stop_log(
        &self,
        log_id: &str,
        ended_at: DateTime<Utc>,
        duration_secs: i64,
        paused_ms: i64,
        overtime_secs: i64,
    ) -> Result<(), StoreError> {
        let row = {
            let conn = self.conn.lock();
            let logs = TimeLogs::new(&conn);
            match logs.close(log_id, ended_at, duration_secs, paused_ms, overtime_secs)? {
                Some(row) => row,
                None if logs.get(log_id)?.is_some() => return Err(StoreError::LogClosed(log_id.to_string())),
                None => return Err(StoreError::LogNotFound(log_id.to_string())),
            }
        };
        self.publish(ChangeKind::Update, row);

        Ok(())
    }

    async fn create_break_log(
        &self,
        user_id: &str,
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
        duration_ms: i64,
    ) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        BreakLogs::new(&conn).insert(user_id, started_at, ended_at, duration_ms)?;
        Ok(())
    }

    async fn fetch_open_log(&self, user_id: &str) -> Result<Option<OpenLog>, StoreError> {
        let conn = self.conn.lock();
        let row = TimeLogs::new(&conn).fetch_open(user_id)?;
        Ok(row.as_ref().map(OpenLog::from))
    }

    async fn fetch_log(&self, log_id: &str) -> Result<Option<TimeLog>, StoreError> {
        let conn = self.conn.lock();
        Ok(TimeLogs::new(&conn).get(log_id)?)
    }

    async fn fetch_break_settings(&self, user_id: &str) -> Result<Option<BreakSettings>, StoreError> {
        let conn = self.conn.lock();
        Ok(BreakSettingsRepo::new(&conn).fetch(user_id)?)
    }

    async fn fetch_task_estimate(&self, task_id: &str) -> Result<Option<i64>, StoreError> {
        let conn = self.conn.lock();
        Ok(Tasks::new(&conn).estimate(task_id)?)
    }

    async fn prior_logged_seconds(&self, task_id: &str) -> Result<i64, StoreError> {
        let conn = self.conn.lock();
        Ok(TimeLogs::new(&conn).prior_seconds(task_id)?)
    }

    fn subscribe(&self, user_id: &str) -> LogFeed {
        LogFeed::new(user_id, self.feed.subscribe())
    }
}
