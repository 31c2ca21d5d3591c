use crate::libs::remote::TimeLog;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use uuid::Uuid;

const COLUMNS: &str = "id, user_id, task_id, started_at, ended_at, duration_actual, overtime_duration, paused_ms";
const INSERT_LOG: &str = "INSERT INTO time_logs (id, user_id, task_id, started_at, paused_ms) VALUES (?1, ?2, ?3, ?4, 0)";
const CLOSE_LOG: &str = "UPDATE time_logs SET ended_at = ?2, duration_actual = ?3, paused_ms = ?4, overtime_duration = ?5 WHERE id = ?1 AND ended_at IS NULL";
const PRIOR_SECONDS: &str = "SELECT COALESCE(SUM(COALESCE(duration_actual, 0) + COALESCE(overtime_duration, 0)), 0)
     FROM time_logs WHERE task_id = ?1 AND ended_at IS NOT NULL";

pub struct TimeLogs<'a> {
    conn: &'a Connection,
}

impl<'a> TimeLogs<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        TimeLogs { conn }
    }

    /// Inserts an open log and returns it.
    pub fn open(&self, user_id: &str, task_id: &str, started_at: DateTime<Utc>) -> Result<TimeLog> {
        let id = Uuid::new_v4().to_string();
        self.conn.execute(INSERT_LOG, params![id, user_id, task_id, started_at])?;

        Ok(TimeLog {
            id,
            user_id: user_id.to_string(),
            task_id: task_id.to_string(),
            started_at,
            ended_at: None,
            duration_actual: None,
            overtime_duration: None,
            paused_ms: 0,
        })
    }

    /// Closes a log; a zero overtime is stored as NULL.
    ///
    /// Returns the updated row, or `None` when no open log has this id. A log
    /// that is already closed is left untouched.
    pub fn close(
        &self,
        log_id: &str,
        ended_at: DateTime<Utc>,
        duration_secs: i64,
        paused_ms: i64,
        overtime_secs: i64,
    ) -> Result<Option<TimeLog>> {
        let overtime = (overtime_secs > 0).then_some(overtime_secs);
        let affected = self.conn.execute(
            CLOSE_LOG,
            params![log_id, ended_at, duration_secs.max(0), paused_ms.max(0), overtime],
        )?;
        if affected == 0 {
            return Ok(None);
        }
        self.get(log_id)
    }

    pub fn get(&self, log_id: &str) -> Result<Option<TimeLog>> {
        let sql = format!("SELECT {} FROM time_logs WHERE id = ?1", COLUMNS);
        self.conn.query_row(&sql, params![log_id], map_log).optional()
    }

    /// The user's most recently started open log.
    pub fn fetch_open(&self, user_id: &str) -> Result<Option<TimeLog>> {
        let sql = format!(
            "SELECT {} FROM time_logs WHERE user_id = ?1 AND ended_at IS NULL ORDER BY started_at DESC LIMIT 1",
            COLUMNS
        );
        self.conn.query_row(&sql, params![user_id], map_log).optional()
    }

    /// Sum of `duration_actual + overtime_duration` over the task's closed logs.
    pub fn prior_seconds(&self, task_id: &str) -> Result<i64> {
        self.conn.query_row(PRIOR_SECONDS, params![task_id], |row| row.get(0))
    }

    /// The user's latest logs, newest first.
    pub fn fetch_recent(&self, user_id: &str, limit: usize) -> Result<Vec<TimeLog>> {
        let sql = format!(
            "SELECT {} FROM time_logs WHERE user_id = ?1 ORDER BY started_at DESC LIMIT ?2",
            COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let logs = stmt
            .query_map(params![user_id, limit as i64], map_log)?
            .collect::<Result<Vec<_>>>()?;

        Ok(logs)
    }
}

fn map_log(row: &Row) -> Result<TimeLog> {
    Ok(TimeLog {
        id: row.get(0)?,
        user_id: row.get(1)?,
        task_id: row.get(2)?,
        started_at: row.get(3)?,
        ended_at: row.get(4)?,
        duration_actual: row.get(5)?,
        overtime_duration: row.get(6)?,
        paused_ms: row.get(7)?,
    })
}
