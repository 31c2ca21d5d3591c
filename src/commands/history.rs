use super::AppContext;
use crate::libs::messages::Message;
use crate::libs::task::TaskFilter;
use crate::libs::view::View;
use crate::{msg_info, msg_print};
use anyhow::Result;
use clap::Args;
use std::collections::HashMap;

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Number of entries to show
    #[arg(long, short, default_value_t = 20)]
    limit: usize,

    /// Show break logs instead of time logs
    #[arg(long, short)]
    breaks: bool,
}

pub fn cmd(args: HistoryArgs) -> Result<()> {
    let ctx = AppContext::load()?;
    let user_id = ctx.require_user()?;

    if args.breaks {
        let breaks = ctx.store.recent_breaks(&user_id, args.limit)?;
        if breaks.is_empty() {
            msg_info!(Message::NoBreaksRecorded);
            return Ok(());
        }
        msg_print!(Message::BreaksHeader, true);
        View::breaks(&breaks);
        return Ok(());
    }

    let logs = ctx.store.recent_logs(&user_id, args.limit)?;
    if logs.is_empty() {
        msg_info!(Message::NoTimeLogsRecorded);
        return Ok(());
    }

    let task_names: HashMap<String, String> = ctx
        .store
        .tasks(&user_id, TaskFilter::All)?
        .into_iter()
        .map(|task| (task.id, task.name))
        .collect();

    msg_print!(Message::TimeLogsHeader, true);
    View::time_logs(&logs, &task_names);
    Ok(())
}
