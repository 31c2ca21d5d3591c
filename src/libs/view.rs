use super::formatter::{format_duration, format_hms};
use super::remote::{BreakLog, BreakSettings, TimeLog};
use super::task::Task;
use chrono::{DateTime, Duration, Local, Utc};
use prettytable::{row, Table};
use std::collections::HashMap;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

fn local(instant: &DateTime<Utc>) -> String {
    instant.with_timezone(&Local).format(TIME_FORMAT).to_string()
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

pub struct View {}

impl View {
    pub fn tasks(tasks: &[Task]) {
        let mut table = Table::new();

        table.add_row(row!["ID", "NAME", "ESTIMATE", "FINISHED"]);
        for task in tasks {
            table.add_row(row![
                short_id(&task.id),
                task.name,
                format_duration(&Duration::seconds(task.duration_estimated)),
                if task.finished { "yes" } else { "" }
            ]);
        }
        table.printstd();
    }

    /// Time logs with task names resolved through `task_names` where known.
    pub fn time_logs(logs: &[TimeLog], task_names: &HashMap<String, String>) {
        let mut table = Table::new();

        table.add_row(row!["TASK", "STARTED", "ENDED", "WORKED", "PAUSED", "OVERTIME"]);
        for log in logs {
            let task = task_names
                .get(&log.task_id)
                .cloned()
                .unwrap_or_else(|| short_id(&log.task_id).to_string());
            table.add_row(row![
                task,
                local(&log.started_at),
                log.ended_at.as_ref().map(local).unwrap_or_else(|| "running".to_string()),
                log.duration_actual.map(|secs| format_hms(secs * 1000)).unwrap_or_default(),
                format_hms(log.paused_ms),
                log.overtime_duration.map(|secs| format_hms(secs * 1000)).unwrap_or_default()
            ]);
        }
        table.printstd();
    }

    pub fn breaks(breaks: &[BreakLog]) {
        let mut table = Table::new();

        table.add_row(row!["STARTED", "ENDED", "DURATION"]);
        for break_log in breaks {
            table.add_row(row![
                local(&break_log.started_at),
                local(&break_log.ended_at),
                format_hms(break_log.duration_ms)
            ]);
        }
        table.printstd();
    }

    pub fn settings(settings: &BreakSettings) {
        let mut table = Table::new();

        table.add_row(row!["SETTING", "MINUTES"]);
        table.add_row(row!["Break every", settings.break_every_mins]);
        table.add_row(row!["Break duration", settings.break_duration_mins]);
        table.add_row(row!["Long pause after", settings.long_pause_mins]);
        table.printstd();
    }
}
