use super::{print_status, AppContext};
use crate::libs::messages::Message;
use crate::{msg_success, msg_warning};
use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub struct BreakArgs {
    #[command(subcommand)]
    command: BreakCommand,
}

#[derive(Debug, Subcommand)]
enum BreakCommand {
    #[command(about = "Start a break, pausing the running task")]
    Start {
        /// Break length in minutes; the configured default when omitted
        #[arg(long, short)]
        minutes: Option<u32>,
    },
    #[command(about = "Extend the current break")]
    Extend {
        /// Minutes to add; without it the break restarts from now with its current length
        #[arg(long, short)]
        minutes: Option<u32>,
    },
    #[command(about = "End the break and resume work")]
    Resume,
    #[command(about = "Skip the suggested break and restart the cadence")]
    Skip,
}

fn mins_to_ms(minutes: u32) -> i64 {
    i64::from(minutes) * 60_000
}

pub async fn cmd(args: BreakArgs) -> Result<()> {
    let ctx = AppContext::load()?;
    let mut timer = ctx.timer().await?;

    match args.command {
        BreakCommand::Start { minutes } => {
            let started = match minutes {
                Some(minutes) => timer.start_break(mins_to_ms(minutes)),
                None => timer.take_break(),
            };
            if started {
                msg_success!(Message::BreakStarted);
            } else {
                msg_warning!(Message::BreakNotAllowed);
            }
        }
        BreakCommand::Extend { minutes } => {
            if timer.extend_break(minutes.map(mins_to_ms)) {
                msg_success!(Message::BreakExtended);
            } else {
                msg_warning!(Message::NotOnBreak);
            }
        }
        BreakCommand::Resume => {
            if timer.resume_from_break().await {
                msg_success!(Message::BreakFinished);
            } else {
                msg_warning!(Message::NotOnBreak);
            }
        }
        BreakCommand::Skip => {
            if timer.skip_break() {
                msg_success!(Message::BreakSkipped);
            } else {
                msg_warning!(Message::TimerNotRunning);
            }
        }
    }

    print_status(&ctx, &timer.snapshot());
    Ok(())
}
