use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub user_id: String,
    pub name: String,
    /// Estimated duration in seconds; 0 means no estimate.
    pub duration_estimated: i64,
    pub finished: bool,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(user_id: &str, name: &str, duration_estimated: i64) -> Self {
        Task {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: name.to_string(),
            duration_estimated: duration_estimated.max(0),
            finished: false,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum TaskFilter {
    All,
    Open,
    ByIds(Vec<String>),
}
