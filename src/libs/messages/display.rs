//! Display implementation for timeblock messages.
//!
//! All user-facing text is defined here, in one match, so that wording stays
//! consistent between commands.

use super::types::Message;
use std::fmt::{Display, Formatter, Result};

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let text = match self {
            // === CONFIGURATION MESSAGES ===
            Message::ConfigSaved => "Configuration saved successfully".to_string(),
            Message::ConfigDeleted => "Configuration deleted".to_string(),
            Message::ConfigMissing => "No configuration to delete".to_string(),
            Message::ConfigModuleHeader(name) => format!("{} settings", name),
            Message::UserNotConfigured => "No user configured. Run `timeblock init` and set up the User section".to_string(),

            // === PROMPTS (SETUP WIZARD) ===
            Message::PromptSelectModules => "Select sections to configure".to_string(),
            Message::PromptUserId => "User id".to_string(),
            Message::PromptAlertRepeat => "Repeat the alert while a prompt is open?".to_string(),
            Message::PromptAlertRepeatSecs => "Seconds between alerts".to_string(),
            Message::PromptTickMs => "Timer tick in milliseconds".to_string(),
            Message::PromptPollMs => "Database check interval in milliseconds".to_string(),

            // === TASK MESSAGES ===
            Message::TaskCreated(name) => format!("Task '{}' created", name),
            Message::TaskFinished(name) => format!("Task '{}' finished", name),
            Message::TaskNotFound(reference) => format!("Task '{}' not found", reference),
            Message::TaskAmbiguous(reference, count) => {
                format!("'{}' matches {} tasks, use a longer id", reference, count)
            }
            Message::TasksNotFound => "No tasks found".to_string(),

            // === TIMER MESSAGES ===
            Message::TimerStarted(name) => format!("Timer started on '{}'", name),
            Message::TimerPaused => "Timer paused".to_string(),
            Message::TimerResumed => "Timer resumed".to_string(),
            Message::TimerStopped(0) => "Timer stopped".to_string(),
            Message::TimerStopped(overtime) => format!("Timer stopped with {}s overtime", overtime),
            Message::TimerNotRunning => "The timer is not running".to_string(),
            Message::TimerNotPaused => "The timer is not paused".to_string(),
            Message::NoActiveTask => "No active task".to_string(),
            Message::StatusLine(status, task, readout) if task.is_empty() => format!("{} {}", status, readout),
            Message::StatusLine(status, task, readout) => format!("{} {} [{}]", status, readout, task),
            Message::RemoteFailures(count) => format!("{} store calls failed; local state was kept", count),

            // === BREAK MESSAGES ===
            Message::BreakStarted => "Break started".to_string(),
            Message::BreakExtended => "Break extended".to_string(),
            Message::BreakFinished => "Break over, back to work".to_string(),
            Message::BreakSkipped => "Break skipped".to_string(),
            Message::BreakNotAllowed => "A break needs an active task and no break in progress".to_string(),
            Message::NotOnBreak => "Not on a break".to_string(),
            Message::SettingsSaved => "Break settings saved".to_string(),

            // === TIMER PROMPTS ===
            Message::PromptVisible(label) => format!("Waiting for you: {}", label),
            Message::PromptLongPause(mins) => format!("Paused for over {} minutes. What now?", mins),
            Message::PromptBreakDue(mins) => format!("{} minutes of work. Time for a break?", mins),
            Message::PromptBreakEnd => "Break is over".to_string(),
            Message::PromptOvertime => "Estimated time is up".to_string(),
            Message::ChoiceStayPaused => "Stay paused".to_string(),
            Message::ChoiceContinueLater => "Continue later (stop)".to_string(),
            Message::ChoiceContinueNow => "Continue now".to_string(),
            Message::ChoiceTakeBreak => "Take a break".to_string(),
            Message::ChoiceSkipBreak => "Skip".to_string(),
            Message::ChoiceResumeWork => "Resume work".to_string(),
            Message::ChoiceExtendBreak => "Extend break".to_string(),
            Message::ChoiceFinishTask => "Finish task".to_string(),
            Message::ChoiceKeepGoing => "Keep going".to_string(),

            // === WATCH MESSAGES ===
            Message::WatchStarted => "Live timer running. Press Ctrl+C to quit".to_string(),
            Message::WatchStopped => "Live timer stopped; the session keeps its state".to_string(),

            // === HISTORY MESSAGES ===
            Message::TimeLogsHeader => "Time logs".to_string(),
            Message::BreaksHeader => "Breaks".to_string(),
            Message::NoTimeLogsRecorded => "No time logs recorded yet".to_string(),
            Message::NoBreaksRecorded => "No breaks recorded yet".to_string(),

            // === MIGRATION MESSAGES ===
            Message::MigrationsFound(count) => format!("Found {} pending database migrations", count),
            Message::RunningMigration(version, name) => format!("Running migration v{}: {}", version, name),
            Message::MigrationFailed(version, error) => format!("Migration v{} failed: {}", version, error),
            Message::MigrationsCompleted(version) => format!("Database schema updated to v{}", version),
        };

        write!(f, "{}", text)
    }
}
