//! Finished breaks.
//!
//! A break log is written once, when the break ends by resuming work or by
//! stopping the timer. Extending a break never touches this table.

use crate::libs::remote::BreakLog;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Result};
use uuid::Uuid;

const INSERT_BREAK: &str = "INSERT INTO break_logs (id, user_id, started_at, ended_at, duration_ms) VALUES (?1, ?2, ?3, ?4, ?5)";
const SELECT_BREAKS: &str = "SELECT id, user_id, started_at, ended_at, duration_ms FROM break_logs
     WHERE user_id = ?1 ORDER BY started_at DESC LIMIT ?2";

pub struct BreakLogs<'a> {
    conn: &'a Connection,
}

impl<'a> BreakLogs<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        BreakLogs { conn }
    }

    pub fn insert(
        &self,
        user_id: &str,
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
        duration_ms: i64,
    ) -> Result<BreakLog> {
        let break_log = BreakLog {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            started_at,
            ended_at,
            duration_ms: duration_ms.max(0),
        };

        self.conn.execute(
            INSERT_BREAK,
            params![
                break_log.id,
                break_log.user_id,
                break_log.started_at,
                break_log.ended_at,
                break_log.duration_ms,
            ],
        )?;

        Ok(break_log)
    }

    /// The user's latest breaks, newest first.
    pub fn fetch_recent(&self, user_id: &str, limit: usize) -> Result<Vec<BreakLog>> {
        let mut stmt = self.conn.prepare(SELECT_BREAKS)?;
        let break_iter = stmt.query_map(params![user_id, limit as i64], |row| {
            Ok(BreakLog {
                id: row.get(0)?,
                user_id: row.get(1)?,
                started_at: row.get(2)?,
                ended_at: row.get(3)?,
                duration_ms: row.get(4)?,
            })
        })?;

        let mut breaks = Vec::new();
        for break_result in break_iter {
            breaks.push(break_result?);
        }

        Ok(breaks)
    }
}
