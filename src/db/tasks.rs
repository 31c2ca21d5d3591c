use crate::libs::task::{Task, TaskFilter};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Result, Row};

const INSERT_TASK: &str = "INSERT INTO tasks (id, user_id, name, duration_estimated, finished, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
const SELECT_TASKS: &str = "SELECT id, user_id, name, duration_estimated, finished, created_at FROM tasks WHERE user_id = ?";
const WHERE_OPEN: &str = "AND finished = FALSE";
const WHERE_ID: &str = "AND id IN";
const ORDER_BY: &str = "ORDER BY created_at";
const SELECT_ESTIMATE: &str = "SELECT duration_estimated FROM tasks WHERE id = ?1";
const UPDATE_FINISHED: &str = "UPDATE tasks SET finished = ?2 WHERE id = ?1";

pub struct Tasks<'a> {
    conn: &'a Connection,
}

impl<'a> Tasks<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Tasks { conn }
    }

    pub fn insert(&self, task: &Task) -> Result<()> {
        self.conn.execute(
            INSERT_TASK,
            params![task.id, task.user_id, task.name, task.duration_estimated, task.finished, task.created_at],
        )?;

        Ok(())
    }

    pub fn fetch(&self, user_id: &str, filter: TaskFilter) -> Result<Vec<Task>> {
        let mut params = vec![user_id.to_string()];
        let sql = match filter {
            TaskFilter::All => format!("{} {}", SELECT_TASKS, ORDER_BY),
            TaskFilter::Open => format!("{} {} {}", SELECT_TASKS, WHERE_OPEN, ORDER_BY),
            TaskFilter::ByIds(ids) => {
                let placeholders = vec!["?"; ids.len()].join(", ");
                params.extend(ids);
                format!("{} {} ({}) {}", SELECT_TASKS, WHERE_ID, placeholders, ORDER_BY)
            }
        };

        let mut stmt = self.conn.prepare(&sql)?;
        let task_iter = stmt.query_map(params_from_iter(params.iter()), map_task)?;
        let mut tasks = Vec::new();
        for task_result in task_iter {
            tasks.push(task_result?);
        }

        Ok(tasks)
    }

    /// Estimated seconds of a task, `None` when the task is unknown.
    pub fn estimate(&self, task_id: &str) -> Result<Option<i64>> {
        self.conn
            .query_row(SELECT_ESTIMATE, params![task_id], |row| row.get(0))
            .optional()
    }

    /// Marks a task finished; returns `false` for an unknown id.
    pub fn set_finished(&self, task_id: &str, finished: bool) -> Result<bool> {
        let affected = self.conn.execute(UPDATE_FINISHED, params![task_id, finished])?;
        Ok(affected > 0)
    }
}

fn map_task(row: &Row) -> Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        duration_estimated: row.get(3)?,
        finished: row.get(4)?,
        created_at: row.get(5)?,
    })
}
