use super::AppContext;
use crate::libs::messages::Message;
use crate::libs::task::{Task, TaskFilter};
use crate::libs::view::View;
use crate::{msg_info, msg_success, msg_warning};
use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub struct TaskArgs {
    #[command(subcommand)]
    command: TaskCommand,
}

#[derive(Debug, Subcommand)]
enum TaskCommand {
    #[command(about = "Create a task")]
    Add {
        #[arg(required = true)]
        name: String,

        /// Estimated duration in minutes; 0 runs the timer as a stopwatch
        #[arg(long, short, default_value_t = 0)]
        estimate: u32,
    },
    #[command(about = "List tasks")]
    List {
        /// Include finished tasks
        #[arg(long, short)]
        all: bool,
    },
    #[command(about = "Mark a task finished")]
    Finish {
        /// Task id, id prefix or exact task name
        #[arg(required = true)]
        task: String,
    },
}

pub fn cmd(args: TaskArgs) -> Result<()> {
    let ctx = AppContext::load()?;
    let user_id = ctx.require_user()?;

    match args.command {
        TaskCommand::Add { name, estimate } => {
            let task = Task::new(&user_id, &name, i64::from(estimate) * 60);
            ctx.store.add_task(&task)?;
            msg_success!(Message::TaskCreated(task.name));
        }
        TaskCommand::List { all } => {
            let filter = if all { TaskFilter::All } else { TaskFilter::Open };
            let tasks = ctx.store.tasks(&user_id, filter)?;
            if tasks.is_empty() {
                msg_info!(Message::TasksNotFound);
            } else {
                View::tasks(&tasks);
            }
        }
        TaskCommand::Finish { task } => {
            let task = ctx.resolve_task(&user_id, &task)?;
            if ctx.store.finish_task(&task.id)? {
                msg_success!(Message::TaskFinished(task.name));
            } else {
                msg_warning!(Message::TaskNotFound(task.id));
            }
        }
    }

    Ok(())
}
