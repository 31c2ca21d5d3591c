//! Scheduled prompts: long pause, break due, break end and overtime.
//!
//! No timers are armed. Every evaluation derives each prompt's deadline from
//! the current session, so a prompt whose governing condition no longer holds
//! simply has no deadline and cannot fire late. A prompt is visible once its
//! deadline has been reached and stays visible until the state that governs it
//! changes.

use crate::libs::readout::TaskMeta;
use crate::libs::remote::BreakSettings;
use crate::libs::session::{Phase, Session};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Prompt {
    LongPause,
    BreakDue,
    BreakEnd,
    Overtime,
}

impl Prompt {
    pub const ALL: [Prompt; 4] = [Prompt::LongPause, Prompt::BreakDue, Prompt::BreakEnd, Prompt::Overtime];
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Prompt::LongPause => "long pause",
            Prompt::BreakDue => "break due",
            Prompt::BreakEnd => "break over",
            Prompt::Overtime => "overtime",
        };
        write!(f, "{}", label)
    }
}

/// Visibility of each prompt, as exposed to consumers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PromptFlags {
    pub long_pause: bool,
    pub break_due: bool,
    pub break_end: bool,
    pub overtime: bool,
}

impl PromptFlags {
    pub fn get(&self, prompt: Prompt) -> bool {
        match prompt {
            Prompt::LongPause => self.long_pause,
            Prompt::BreakDue => self.break_due,
            Prompt::BreakEnd => self.break_end,
            Prompt::Overtime => self.overtime,
        }
    }

    fn set(&mut self, prompt: Prompt, visible: bool) {
        match prompt {
            Prompt::LongPause => self.long_pause = visible,
            Prompt::BreakDue => self.break_due = visible,
            Prompt::BreakEnd => self.break_end = visible,
            Prompt::Overtime => self.overtime = visible,
        }
    }

    pub fn any(&self) -> bool {
        self.long_pause || self.break_due || self.break_end || self.overtime
    }

    pub fn visible(&self) -> Vec<Prompt> {
        Prompt::ALL.into_iter().filter(|prompt| self.get(*prompt)).collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PromptScheduler {
    flags: PromptFlags,
    /// `(pause it applies to, re-armed at)` after the user chose to stay paused.
    long_pause_snooze: Option<(DateTime<Utc>, DateTime<Utc>)>,
    /// Log (or task, when the log id is unknown) whose overtime was acknowledged.
    overtime_ack: Option<String>,
}

fn overtime_key(session: &Session) -> Option<String> {
    let task = session.task()?;
    Some(match &task.log_id {
        Some(log_id) => format!("log:{}", log_id),
        None => format!("task:{}", task.task_id),
    })
}

impl PromptScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flags(&self) -> PromptFlags {
        self.flags
    }

    /// When `prompt` becomes (or became) due for the current state.
    pub fn deadline(
        &self,
        prompt: Prompt,
        session: &Session,
        settings: &BreakSettings,
        meta: Option<&TaskMeta>,
    ) -> Option<DateTime<Utc>> {
        match (prompt, &session.phase) {
            (Prompt::LongPause, Phase::Paused { pause_started_at, .. }) => {
                let threshold = settings.long_pause_ms();
                if threshold <= 0 {
                    return None;
                }
                let anchor = match self.long_pause_snooze {
                    Some((pause, snoozed_at)) if pause == *pause_started_at => snoozed_at,
                    _ => *pause_started_at,
                };
                Some(anchor + Duration::milliseconds(threshold))
            }
            (Prompt::BreakDue, Phase::Working { started_at, .. }) => {
                let every = settings.break_every_ms();
                if every <= 0 {
                    return None;
                }
                Some(*started_at + Duration::milliseconds(every - session.work_ms_since_break))
            }
            (
                Prompt::BreakEnd,
                Phase::OnBreak {
                    break_started_at,
                    break_duration_ms,
                    ..
                },
            ) => Some(*break_started_at + Duration::milliseconds(*break_duration_ms)),
            (Prompt::Overtime, Phase::Working { task, started_at }) => {
                let meta = meta.filter(|meta| meta.task_id == task.task_id && meta.has_estimate())?;
                if self.overtime_ack.is_some() && self.overtime_ack == overtime_key(session) {
                    return None;
                }
                let remaining = meta.estimate_secs * 1000 - meta.prior_logged_secs * 1000 - task.elapsed_ms;
                Some(*started_at + Duration::milliseconds(remaining))
            }
            _ => None,
        }
    }

    /// Re-derives visibility at `now` and returns the prompts that just appeared.
    pub fn evaluate(
        &mut self,
        session: &Session,
        settings: &BreakSettings,
        meta: Option<&TaskMeta>,
        now: DateTime<Utc>,
    ) -> Vec<Prompt> {
        self.forget_stale(session);

        let mut fired = Vec::new();
        for prompt in Prompt::ALL {
            let visible = self
                .deadline(prompt, session, settings, meta)
                .is_some_and(|deadline| now >= deadline);
            if visible && !self.flags.get(prompt) {
                fired.push(prompt);
            }
            self.flags.set(prompt, visible);
        }
        fired
    }

    /// Re-arms the long-pause prompt from `now` for the current pause.
    pub fn stay_paused(&mut self, session: &Session, now: DateTime<Utc>) {
        if let Phase::Paused { pause_started_at, .. } = session.phase {
            self.long_pause_snooze = Some((pause_started_at, now));
        }
    }

    /// Silences the overtime prompt for the rest of the current log.
    pub fn keep_going(&mut self, session: &Session) {
        self.overtime_ack = overtime_key(session);
    }

    fn forget_stale(&mut self, session: &Session) {
        if let Some((pause, _)) = self.long_pause_snooze {
            if session.pause_started_at() != Some(pause) {
                self.long_pause_snooze = None;
            }
        }
        if self.overtime_ack.is_some() && self.overtime_ack != overtime_key(session) {
            self.overtime_ack = None;
        }
    }
}
