//! Live timer in the terminal.
//!
//! Runs the timer service, redraws a status line on every snapshot and asks
//! the user what to do whenever a prompt becomes visible. The session keeps
//! converging with one-shot commands run in other terminals by polling the
//! database.

use super::AppContext;
use crate::libs::alert::TerminalBell;
use crate::libs::messages::Message;
use crate::libs::prompts::Prompt;
use crate::libs::service::{Command, TimerService};
use crate::libs::timer::TimerSnapshot;
use crate::{msg_info, msg_print};
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Select};
use std::io::Write;

fn choices(prompt: Prompt) -> Vec<(Message, Command)> {
    match prompt {
        Prompt::LongPause => vec![
            (Message::ChoiceStayPaused, Command::StayPaused),
            (Message::ChoiceContinueLater, Command::ContinueLater),
            (Message::ChoiceContinueNow, Command::ContinueNow),
        ],
        Prompt::BreakDue => vec![
            (Message::ChoiceTakeBreak, Command::TakeBreak),
            (Message::ChoiceSkipBreak, Command::SkipBreak),
        ],
        Prompt::BreakEnd => vec![
            (Message::ChoiceResumeWork, Command::ResumeFromBreak),
            (Message::ChoiceExtendBreak, Command::ExtendBreak(None)),
        ],
        Prompt::Overtime => vec![
            (Message::ChoiceFinishTask, Command::FinishOvertime),
            (Message::ChoiceKeepGoing, Command::KeepGoing),
        ],
    }
}

fn title(prompt: Prompt, snapshot: &TimerSnapshot) -> Message {
    match prompt {
        Prompt::LongPause => Message::PromptLongPause(snapshot.settings.long_pause_mins),
        Prompt::BreakDue => Message::PromptBreakDue(snapshot.settings.break_every_mins),
        Prompt::BreakEnd => Message::PromptBreakEnd,
        Prompt::Overtime => Message::PromptOvertime,
    }
}

/// Asks the user to resolve `prompt`; `None` when they dismissed the menu.
fn ask(prompt: Prompt, snapshot: TimerSnapshot) -> Result<Option<Command>> {
    let options = choices(prompt);
    let labels: Vec<String> = options.iter().map(|(label, _)| label.to_string()).collect();

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(title(prompt, &snapshot).to_string())
        .items(&labels)
        .default(0)
        .interact_opt()?;

    Ok(selection.and_then(|index| options.into_iter().nth(index).map(|(_, command)| command)))
}

fn render(snapshot: &TimerSnapshot) {
    let mut stdout = std::io::stdout();
    let _ = write!(stdout, "\r{:<8} {}   ", snapshot.status.to_string(), snapshot.display());
    let _ = stdout.flush();
}

pub async fn cmd() -> Result<()> {
    let ctx = AppContext::load()?;
    let timer = ctx.config.timer.clone().unwrap_or_default();
    let core = ctx.timer().await?;

    let handle = TimerService::spawn(core, timer.tick(), timer.poll(), Box::new(TerminalBell));
    let mut snapshots = handle.subscribe();
    let mut dismissed: Vec<Prompt> = Vec::new();

    msg_info!(Message::WatchStarted);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                break;
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                render(&snapshot);

                let visible = snapshot.prompts.visible();
                dismissed.retain(|prompt| visible.contains(prompt));

                let Some(prompt) = visible.into_iter().find(|prompt| !dismissed.contains(prompt)) else {
                    continue;
                };

                println!();
                match tokio::task::spawn_blocking(move || ask(prompt, snapshot)).await?? {
                    Some(command) => {
                        let snapshot = handle.send(command).await?;
                        render(&snapshot);
                    }
                    None => dismissed.push(prompt),
                }
            }
        }
    }

    println!();
    handle.shutdown().await?;
    msg_print!(Message::WatchStopped);
    Ok(())
}
