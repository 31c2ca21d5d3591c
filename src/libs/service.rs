//! Runtime host for a [`TimerCore`].
//!
//! The service moves the core into one tokio task that is its only writer. A
//! single loop multiplexes consumer commands, the logical clock tick, the
//! live feed of remote time-log changes and a slower poll of the store for
//! changes made by other processes, so display updates, prompt deadlines and
//! reconciliation all observe one consistent session.

use crate::libs::alert::AlertSink;
use crate::libs::remote::{BreakSettingsUpdate, LogChange, LogFeed, TaskId};
use crate::libs::timer::{TimerCore, TimerSnapshot};
use anyhow::{anyhow, Result};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

const COMMAND_BUFFER: usize = 32;

/// A consumer command for the timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start(TaskId),
    Pause,
    Resume,
    Stop { overtime_secs: i64 },
    StartBreak { duration_ms: i64 },
    TakeBreak,
    SkipBreak,
    ResumeFromBreak,
    ExtendBreak(Option<i64>),
    StayPaused,
    ContinueLater,
    ContinueNow,
    FinishOvertime,
    KeepGoing,
    UpdateSettings(BreakSettingsUpdate),
    /// Returns the current snapshot without changing anything.
    Refresh,
    Shutdown,
}

type Request = (Command, oneshot::Sender<TimerSnapshot>);

/// Client side of a running [`TimerService`].
pub struct TimerHandle {
    tx: mpsc::Sender<Request>,
    snapshots: watch::Receiver<TimerSnapshot>,
    join: JoinHandle<()>,
}

impl TimerHandle {
    /// Sends a command and waits for the snapshot taken right after it.
    pub async fn send(&self, command: Command) -> Result<TimerSnapshot> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send((command, reply_tx))
            .await
            .map_err(|_| anyhow!("timer service is not running"))?;
        reply_rx.await.map_err(|_| anyhow!("timer service dropped the command"))
    }

    /// Snapshots published after every change and every tick.
    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshots.clone()
    }

    /// Stops the service loop and waits for it to finish.
    pub async fn shutdown(self) -> Result<()> {
        // The loop may already be gone; joining is what matters.
        let _ = self.send(Command::Shutdown).await;
        self.join.await?;
        Ok(())
    }
}

pub struct TimerService;

impl TimerService {
    /// Moves `core` into a background task ticking every `tick` and polling
    /// the store every `poll`.
    pub fn spawn(core: TimerCore, tick: Duration, poll: Duration, sink: Box<dyn AlertSink>) -> TimerHandle {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let snapshots = core.subscribe();
        let feed = core.subscribe_feed();

        let join = tokio::spawn(run(core, rx, feed, tick, poll, sink));

        TimerHandle { tx, snapshots, join }
    }
}

async fn next_change(feed: &mut Option<LogFeed>) -> Option<LogChange> {
    match feed {
        Some(feed) => feed.recv().await,
        None => std::future::pending().await,
    }
}

async fn run(
    mut core: TimerCore,
    mut rx: mpsc::Receiver<Request>,
    mut feed: Option<LogFeed>,
    tick: Duration,
    poll: Duration,
    sink: Box<dyn AlertSink>,
) {
    let mut interval = time::interval(tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut poller = time::interval(poll);
    poller.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tracing::debug!(
        tick_ms = tick.as_millis() as u64,
        poll_ms = poll.as_millis() as u64,
        "timer service started"
    );

    loop {
        tokio::select! {
            request = rx.recv() => {
                let Some((command, reply)) = request else {
                    break;
                };
                let shutdown = command == Command::Shutdown;
                apply(&mut core, command).await;
                let _ = reply.send(core.snapshot());
                if shutdown {
                    break;
                }
            }
            _ = interval.tick() => {
                let outcome = core.tick();
                if outcome.alert {
                    sink.play();
                }
            }
            _ = poller.tick() => {
                core.poll_store().await;
            }
            change = next_change(&mut feed) => {
                match change {
                    Some(change) => {
                        core.apply_remote_change(change).await;
                    }
                    None => {
                        tracing::warn!("live feed closed; continuing without reconciliation");
                        feed = None;
                    }
                }
            }
        }
    }

    tracing::debug!("timer service stopped");
}

async fn apply(core: &mut TimerCore, command: Command) {
    match command {
        Command::Start(task_id) => {
            core.start(&task_id).await;
        }
        Command::Pause => {
            core.pause();
        }
        Command::Resume => {
            core.resume();
        }
        Command::Stop { overtime_secs } => {
            core.stop(overtime_secs).await;
        }
        Command::StartBreak { duration_ms } => {
            core.start_break(duration_ms);
        }
        Command::TakeBreak => {
            core.take_break();
        }
        Command::SkipBreak => {
            core.skip_break();
        }
        Command::ResumeFromBreak => {
            core.resume_from_break().await;
        }
        Command::ExtendBreak(additional_ms) => {
            core.extend_break(additional_ms);
        }
        Command::StayPaused => {
            core.stay_paused();
        }
        Command::ContinueLater => {
            core.continue_later().await;
        }
        Command::ContinueNow => {
            core.continue_now();
        }
        Command::FinishOvertime => {
            core.finish_overtime().await;
        }
        Command::KeepGoing => {
            core.keep_going();
        }
        Command::UpdateSettings(update) => core.update_break_settings(update),
        Command::Refresh | Command::Shutdown => {}
    }
}
