//! One-shot timer commands: start, pause, resume and stop.
//!
//! Each invocation restores the persisted session, reconciles it with the
//! store, applies one transition and persists the result again.

use super::{print_status, AppContext};
use crate::libs::messages::Message;
use crate::{msg_success, msg_warning};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct StartArgs {
    /// Task id, id prefix or exact task name
    #[arg(required = true)]
    task: String,
}

#[derive(Debug, Args)]
pub struct StopArgs {
    /// Record the time spent beyond the task estimate as overtime
    #[arg(long, short)]
    overtime: bool,
}

pub async fn start(args: StartArgs) -> Result<()> {
    let ctx = AppContext::load()?;
    let user_id = ctx.require_user()?;
    let task = ctx.resolve_task(&user_id, &args.task)?;

    let mut timer = ctx.timer().await?;
    timer.start(&task.id).await;
    msg_success!(Message::TimerStarted(task.name));
    print_status(&ctx, &timer.snapshot());

    Ok(())
}

pub async fn pause() -> Result<()> {
    let ctx = AppContext::load()?;
    let mut timer = ctx.timer().await?;

    if timer.pause() {
        msg_success!(Message::TimerPaused);
    } else {
        msg_warning!(Message::TimerNotRunning);
    }
    print_status(&ctx, &timer.snapshot());

    Ok(())
}

pub async fn resume() -> Result<()> {
    let ctx = AppContext::load()?;
    let mut timer = ctx.timer().await?;

    if timer.resume() {
        msg_success!(Message::TimerResumed);
    } else {
        msg_warning!(Message::TimerNotPaused);
    }
    print_status(&ctx, &timer.snapshot());

    Ok(())
}

pub async fn stop(args: StopArgs) -> Result<()> {
    let ctx = AppContext::load()?;
    let mut timer = ctx.timer().await?;

    let overtime_secs = if args.overtime { timer.overtime_secs() } else { 0 };
    if timer.stop(overtime_secs).await {
        msg_success!(Message::TimerStopped(overtime_secs));
    } else {
        msg_warning!(Message::NoActiveTask);
    }

    Ok(())
}
