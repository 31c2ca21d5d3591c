pub mod breaks;
pub mod history;
pub mod init;
pub mod settings;
pub mod status;
pub mod task;
pub mod timer;
pub mod watch;

use crate::db::db::Db;
use crate::db::store::SqliteStore;
use crate::libs::alert::AlertLoop;
use crate::libs::clock::SystemClock;
use crate::libs::config::Config;
use crate::libs::data_storage::DataStorage;
use crate::libs::messages::Message;
use crate::libs::storage::FileSessionStorage;
use crate::libs::task::{Task, TaskFilter};
use crate::libs::timer::{TimerCore, TimerSnapshot};
use crate::{msg_bail_anyhow, msg_error_anyhow, msg_print};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Configuration initialization")]
    Init(init::InitArgs),
    #[command(about = "Add, list and finish tasks", arg_required_else_help = true)]
    Task(task::TaskArgs),
    #[command(about = "Start the timer on a task")]
    Start(timer::StartArgs),
    #[command(about = "Pause the running timer")]
    Pause,
    #[command(about = "Resume the paused timer")]
    Resume,
    #[command(about = "Stop the timer and close the time log")]
    Stop(timer::StopArgs),
    #[command(about = "Start, extend, end or skip a break", arg_required_else_help = true)]
    Break(breaks::BreakArgs),
    #[command(about = "Show the timer state")]
    Status,
    #[command(about = "Show or change break settings")]
    Settings(settings::SettingsArgs),
    #[command(about = "Show recorded time logs and breaks")]
    History(history::HistoryArgs),
    #[command(about = "Run the live timer with prompts")]
    Watch,
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub async fn menu() -> Result<()> {
        let cli = Self::parse();
        match cli.command {
            Commands::Init(args) => init::cmd(args),
            Commands::Task(args) => task::cmd(args),
            Commands::Start(args) => timer::start(args).await,
            Commands::Pause => timer::pause().await,
            Commands::Resume => timer::resume().await,
            Commands::Stop(args) => timer::stop(args).await,
            Commands::Break(args) => breaks::cmd(args).await,
            Commands::Status => status::cmd().await,
            Commands::Settings(args) => settings::cmd(args).await,
            Commands::History(args) => history::cmd(args),
            Commands::Watch => watch::cmd().await,
        }
    }
}

/// Everything a command needs: configuration and the opened store.
pub struct AppContext {
    pub data_storage: DataStorage,
    pub config: Config,
    pub store: SqliteStore,
}

impl AppContext {
    pub fn load() -> Result<Self> {
        Self::with_storage(DataStorage::new())
    }

    pub fn with_storage(data_storage: DataStorage) -> Result<Self> {
        let config = Config::read_from(&data_storage)?;
        let store = SqliteStore::new(Db::with_storage(&data_storage)?);

        Ok(AppContext {
            data_storage,
            config,
            store,
        })
    }

    /// The configured user, or an error pointing at `init`.
    pub fn require_user(&self) -> Result<String> {
        self.config.user_id().ok_or_else(|| msg_error_anyhow!(Message::UserNotConfigured))
    }

    /// Builds a bootstrapped timer over the local session file and the store.
    pub async fn timer(&self) -> Result<TimerCore> {
        let sound = self.config.sound.clone().unwrap_or_default();
        let mut core = TimerCore::new(
            Arc::new(self.store.clone()),
            Box::new(FileSessionStorage::new(&self.data_storage)?),
            Arc::new(SystemClock),
            self.config.user_id(),
        )
        .with_alert(AlertLoop::new(sound.repeat, sound.repeat_secs));
        core.bootstrap().await;

        Ok(core)
    }

    /// Finds a task by id, id prefix or exact name.
    pub fn resolve_task(&self, user_id: &str, reference: &str) -> Result<Task> {
        let tasks = self.store.tasks(user_id, TaskFilter::All)?;
        let reference = reference.trim();

        if let Some(task) = tasks.iter().find(|task| task.id == reference) {
            return Ok(task.clone());
        }

        let matches: Vec<&Task> = tasks
            .iter()
            .filter(|task| task.id.starts_with(reference) || task.name == reference)
            .collect();

        match matches.as_slice() {
            [task] => Ok((*task).clone()),
            [] => msg_bail_anyhow!(Message::TaskNotFound(reference.to_string())),
            _ => Err(msg_error_anyhow!(Message::TaskAmbiguous(reference.to_string(), matches.len()))),
        }
    }

    pub fn task_name(&self, user_id: &str, task_id: &str) -> Option<String> {
        self.store
            .tasks(user_id, TaskFilter::ByIds(vec![task_id.to_string()]))
            .ok()
            .and_then(|tasks| tasks.into_iter().next())
            .map(|task| task.name)
    }
}

/// Prints the one-line timer status after a command.
pub(crate) fn print_status(ctx: &AppContext, snapshot: &TimerSnapshot) {
    let task = match (ctx.config.user_id(), snapshot.active_task_id.as_deref()) {
        (Some(user_id), Some(task_id)) => ctx.task_name(&user_id, task_id).unwrap_or_else(|| task_id.to_string()),
        (_, Some(task_id)) => task_id.to_string(),
        _ => String::new(),
    };
    msg_print!(Message::StatusLine(snapshot.status.to_string(), task, snapshot.display()));
}
