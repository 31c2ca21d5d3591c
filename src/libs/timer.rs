//! The timer core.
//!
//! [`TimerCore`] owns the [`Session`] and is its only writer. Every command
//! applies a pure transition first, then talks to the store on a best-effort
//! basis: a failed remote call is logged and counted but never undoes or
//! blocks the local transition. After each change the session is persisted,
//! the prompts are re-evaluated and subscribers receive a fresh
//! [`TimerSnapshot`].

use crate::libs::alert::AlertLoop;
use crate::libs::clock::Clock;
use crate::libs::formatter::ms_to_rounded_secs;
use crate::libs::prompts::{Prompt, PromptFlags, PromptScheduler};
use crate::libs::readout::{self, Readout, TaskMeta};
use crate::libs::remote::{
    BreakSettings, BreakSettingsUpdate, ChangeKind, LogChange, LogFeed, LogId, OpenLog, SessionStore, StoreError,
    TaskId, UserId,
};
use crate::libs::session::{Session, Status, Stopped};
use crate::libs::storage::{SessionRecord, SessionStorage};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;

/// Read-only view of the timer handed to consumers.
#[derive(Debug, Clone, Serialize)]
pub struct TimerSnapshot {
    pub status: Status,
    pub active_task_id: Option<TaskId>,
    pub current_log_id: Option<LogId>,
    pub readout: Readout,
    pub prompts: PromptFlags,
    pub settings: BreakSettings,
    pub work_ms_since_break: i64,
    /// Remote calls that failed since the core was created.
    pub remote_failures: u64,
    pub at: DateTime<Utc>,
}

impl TimerSnapshot {
    pub fn display(&self) -> String {
        self.readout.text()
    }
}

/// Result of one clock tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Prompts that became visible since the previous tick.
    pub fired: Vec<Prompt>,
    /// Whether the audible alert should sound now.
    pub alert: bool,
}

pub struct TimerCore {
    store: Arc<dyn SessionStore>,
    storage: Box<dyn SessionStorage>,
    clock: Arc<dyn Clock>,
    user_id: Option<UserId>,
    session: Session,
    settings: BreakSettings,
    meta: Option<TaskMeta>,
    prompts: PromptScheduler,
    pending: Vec<Prompt>,
    alert: AlertLoop,
    remote_failures: u64,
    notifier: watch::Sender<TimerSnapshot>,
}

impl TimerCore {
    /// Creates the core and restores the locally persisted session.
    ///
    /// Unreadable local state is logged and replaced by the idle session.
    pub fn new(
        store: Arc<dyn SessionStore>,
        storage: Box<dyn SessionStorage>,
        clock: Arc<dyn Clock>,
        user_id: Option<UserId>,
    ) -> Self {
        let now = clock.now();
        let session = match storage.load() {
            Ok(Some(record)) => record.into_session(now),
            Ok(None) => Session::idle(),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable timer state");
                Session::idle()
            }
        };

        let settings = BreakSettings::default();
        let prompts = PromptScheduler::new();
        let initial = build_snapshot(&session, &settings, None, prompts.flags(), 0, now);
        let (notifier, _) = watch::channel(initial);

        TimerCore {
            store,
            storage,
            clock,
            user_id,
            session,
            settings,
            meta: None,
            prompts,
            pending: Vec::new(),
            alert: AlertLoop::default(),
            remote_failures: 0,
            notifier,
        }
    }

    pub fn with_alert(mut self, alert: AlertLoop) -> Self {
        self.alert = alert;
        self
    }

    /// Loads break settings and, when idle, adopts the user's open remote log.
    ///
    /// A restored non-idle session is checked against the store instead, so
    /// state persisted before another process changed the log is corrected.
    pub async fn bootstrap(&mut self) {
        let Some(user_id) = self.user_id.clone() else {
            tracing::debug!("no user identity; timer runs without remote state");
            self.commit();
            return;
        };

        match self.store.fetch_break_settings(&user_id).await {
            Ok(Some(settings)) => self.settings = settings,
            Ok(None) => self.settings = BreakSettings::default(),
            Err(e) => self.report_failure("fetch_break_settings", &e),
        }

        if self.session.is_idle() {
            match self.store.fetch_open_log(&user_id).await {
                Ok(Some(open)) => {
                    tracing::info!(log_id = %open.id, task_id = %open.task_id, "adopting open time log");
                    self.adopt(open);
                }
                Ok(None) => {}
                Err(e) => self.report_failure("fetch_open_log", &e),
            }
        } else {
            self.poll_store().await;
        }

        self.refresh_meta().await;
        self.commit();
    }

    // Accessors

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn settings(&self) -> &BreakSettings {
        &self.settings
    }

    pub fn meta(&self) -> Option<&TaskMeta> {
        self.meta.as_ref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn remote_failures(&self) -> u64 {
        self.remote_failures
    }

    pub fn prompts(&self) -> PromptFlags {
        self.prompts.flags()
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        build_snapshot(
            &self.session,
            &self.settings,
            self.meta.as_ref(),
            self.prompts.flags(),
            self.remote_failures,
            self.clock.now(),
        )
    }

    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.notifier.subscribe()
    }

    /// Live feed of time-log changes for the current user.
    pub fn subscribe_feed(&self) -> Option<LogFeed> {
        self.user_id.as_deref().map(|user_id| self.store.subscribe(user_id))
    }

    // Commands

    /// Starts tracking `task_id`, closing any log that is still open.
    ///
    /// Does nothing without a user identity.
    pub async fn start(&mut self, task_id: &str) -> bool {
        let Some(user_id) = self.user_id.clone() else {
            tracing::debug!(task_id, "start ignored: no user identity");
            return false;
        };
        let now = self.clock.now();
        let work_ms_since_break = self.session.work_ms_since_break;

        if let Some(stopped) = self.session.stop(now) {
            self.close_log(stopped, 0, now).await;
        }

        let log_id = match self.store.start_log(&user_id, task_id, now).await {
            Ok(log_id) => Some(log_id),
            Err(e) => {
                self.report_failure("start_log", &e);
                None
            }
        };

        self.session.begin(task_id, log_id, now);
        self.session.work_ms_since_break = work_ms_since_break;
        tracing::debug!(task_id, log_id = ?self.session.current_log_id(), "timer started");

        self.refresh_meta().await;
        self.commit();
        true
    }

    pub fn pause(&mut self) -> bool {
        let changed = self.session.pause(self.clock.now());
        if changed {
            tracing::debug!("timer paused");
            self.commit();
        }
        changed
    }

    pub fn resume(&mut self) -> bool {
        let changed = self.session.resume(self.clock.now());
        if changed {
            tracing::debug!("timer resumed");
            self.commit();
        }
        changed
    }

    /// Stops the active task, recording `overtime_secs` on its log.
    pub async fn stop(&mut self, overtime_secs: i64) -> bool {
        let now = self.clock.now();
        let Some(stopped) = self.session.stop(now) else {
            return false;
        };
        tracing::debug!(task_id = %stopped.totals.task_id, overtime_secs, "timer stopped");

        self.close_log(stopped, overtime_secs.max(0), now).await;
        self.meta = None;
        self.commit();
        true
    }

    /// Starts a break of `duration_ms`.
    pub fn start_break(&mut self, duration_ms: i64) -> bool {
        let changed = self.session.start_break(duration_ms, self.clock.now());
        if changed {
            tracing::debug!(duration_ms, "break started");
            self.commit();
        }
        changed
    }

    /// Starts a break of the configured default length.
    pub fn take_break(&mut self) -> bool {
        self.start_break(self.settings.break_duration_ms())
    }

    /// Declines the suggested break; the cadence restarts from now.
    pub fn skip_break(&mut self) -> bool {
        if self.session.is_idle() || self.session.status() == Status::OnBreak {
            return false;
        }
        self.session.skip_break(self.clock.now());
        tracing::debug!("break skipped");
        self.commit();
        true
    }

    pub async fn resume_from_break(&mut self) -> bool {
        let now = self.clock.now();
        let Some(finished) = self.session.resume_from_break(now) else {
            return false;
        };
        tracing::debug!(duration_ms = finished.duration_ms, "break finished");

        self.record_break(finished.started_at, finished.ended_at, finished.duration_ms).await;
        self.commit();
        true
    }

    /// Extends the current break by `additional_ms`, or restarts its deadline
    /// from now with the break's own length.
    pub fn extend_break(&mut self, additional_ms: Option<i64>) -> bool {
        let changed = self.session.extend_break(additional_ms, self.clock.now());
        if changed {
            tracing::debug!(
                additional_ms = ?additional_ms,
                break_duration_ms = ?self.session.break_duration_ms(),
                "break extended"
            );
            self.commit();
        }
        changed
    }

    /// Dismisses the long-pause prompt; it comes back after another threshold.
    pub fn stay_paused(&mut self) -> bool {
        if self.session.status() != Status::Paused {
            return false;
        }
        self.prompts.stay_paused(&self.session, self.clock.now());
        self.commit();
        true
    }

    pub async fn continue_later(&mut self) -> bool {
        self.stop(0).await
    }

    pub fn continue_now(&mut self) -> bool {
        self.resume()
    }

    /// Overtime in whole seconds if the active task were finished now.
    pub fn overtime_secs(&self) -> i64 {
        let Some(meta) = self.meta.as_ref().filter(|meta| meta.has_estimate()) else {
            return 0;
        };
        let worked_secs = meta.prior_logged_secs + ms_to_rounded_secs(self.session.total_elapsed_ms(self.clock.now()));
        (worked_secs - meta.estimate_secs).max(0)
    }

    /// Finishes the task from the overtime prompt, recording the overrun.
    pub async fn finish_overtime(&mut self) -> bool {
        let overtime_secs = self.overtime_secs();
        self.stop(overtime_secs).await
    }

    /// Keeps working past the estimate without further overtime prompts.
    pub fn keep_going(&mut self) -> bool {
        if self.session.is_idle() {
            return false;
        }
        self.prompts.keep_going(&self.session);
        self.commit();
        true
    }

    /// Applies a partial break-settings update immediately.
    pub fn update_break_settings(&mut self, update: BreakSettingsUpdate) {
        self.settings.apply(&update);
        tracing::debug!(settings = ?self.settings, "break settings updated");
        self.commit();
    }

    /// Reconciles with a change made by another instance of the same user.
    ///
    /// An open log other than ours replaces the local session; closing our
    /// log elsewhere forces idle. Returns whether the session changed.
    pub async fn apply_remote_change(&mut self, change: LogChange) -> bool {
        let row = change.row;
        let ours = self.session.current_log_id() == Some(row.id.as_str());

        match change.kind {
            ChangeKind::Insert if row.is_open() && !ours => {
                tracing::info!(log_id = %row.id, task_id = %row.task_id, "adopting time log opened elsewhere");
                self.session = Session::idle();
                self.adopt(OpenLog::from(&row));
                self.refresh_meta().await;
                self.commit();
                true
            }
            ChangeKind::Update if !row.is_open() && ours => {
                tracing::info!(log_id = %row.id, "time log closed elsewhere; going idle");
                self.session = Session::idle();
                self.meta = None;
                self.commit();
                true
            }
            _ => false,
        }
    }

    /// Reads the user's time logs back from the store and reconciles with
    /// whatever another process changed since the last look.
    ///
    /// A newer open log that is not ours is adopted; our log found closed
    /// makes the session idle. Both go through [`Self::apply_remote_change`],
    /// so a change already seen on the live feed is a no-op here.
    pub async fn poll_store(&mut self) -> bool {
        let Some(user_id) = self.user_id.clone() else {
            return false;
        };
        let ours = self.session.current_log_id().map(str::to_owned);

        let open = match self.store.fetch_open_log(&user_id).await {
            Ok(open) => open,
            Err(e) => {
                self.report_failure("fetch_open_log", &e);
                return false;
            }
        };

        let (kind, log_id) = match open {
            Some(open) if ours.as_deref() != Some(open.id.as_str()) => (ChangeKind::Insert, open.id),
            Some(_) => return false,
            None => match ours {
                Some(log_id) => (ChangeKind::Update, log_id),
                None => return false,
            },
        };

        match self.store.fetch_log(&log_id).await {
            Ok(Some(row)) => self.apply_remote_change(LogChange { kind, row }).await,
            Ok(None) => {
                tracing::debug!(%log_id, "time log vanished before it could be read");
                false
            }
            Err(e) => {
                self.report_failure("fetch_log", &e);
                false
            }
        }
    }

    /// Advances the logical clock: re-evaluates prompts and the alert.
    pub fn tick(&mut self) -> TickOutcome {
        self.evaluate_prompts();
        let now = self.clock.now();
        let alert = self.alert.update(self.prompts.flags().any(), now);
        self.notify();

        TickOutcome {
            fired: std::mem::take(&mut self.pending),
            alert,
        }
    }

    // Internals

    fn adopt(&mut self, open: OpenLog) {
        self.session.adopt(open.task_id, open.id, open.started_at, open.paused_ms);
    }

    async fn close_log(&mut self, stopped: Stopped, overtime_secs: i64, now: DateTime<Utc>) {
        if let Some(finished) = stopped.finished_break {
            self.record_break(finished.started_at, finished.ended_at, finished.duration_ms)
                .await;
        }

        let totals = stopped.totals;
        let Some(log_id) = totals.log_id else {
            tracing::debug!(task_id = %totals.task_id, "no open log to close");
            return;
        };

        let duration_secs = ms_to_rounded_secs(totals.elapsed_ms);
        match self
            .store
            .stop_log(&log_id, now, duration_secs, totals.paused_ms, overtime_secs)
            .await
        {
            Ok(()) => {}
            Err(StoreError::LogClosed(log_id)) => {
                tracing::info!(%log_id, "time log was already closed elsewhere; keeping its accounting");
            }
            Err(e) => self.report_failure("stop_log", &e),
        }
    }

    async fn record_break(&mut self, started_at: DateTime<Utc>, ended_at: DateTime<Utc>, duration_ms: i64) {
        let Some(user_id) = self.user_id.clone() else {
            return;
        };
        if let Err(e) = self
            .store
            .create_break_log(&user_id, started_at, ended_at, duration_ms)
            .await
        {
            self.report_failure("create_break_log", &e);
        }
    }

    async fn refresh_meta(&mut self) {
        let Some(task_id) = self.session.active_task_id().map(str::to_owned) else {
            self.meta = None;
            return;
        };

        let estimate_secs = match self.store.fetch_task_estimate(&task_id).await {
            Ok(estimate) => estimate.unwrap_or(0),
            Err(e) => {
                self.report_failure("fetch_task_estimate", &e);
                0
            }
        };
        let prior_logged_secs = match self.store.prior_logged_seconds(&task_id).await {
            Ok(secs) => secs,
            Err(e) => {
                self.report_failure("prior_logged_seconds", &e);
                0
            }
        };

        self.meta = Some(TaskMeta {
            task_id,
            estimate_secs,
            prior_logged_secs,
        });
    }

    fn report_failure(&mut self, operation: &'static str, error: &StoreError) {
        self.remote_failures += 1;
        tracing::warn!(operation, error = %error, "remote call failed; keeping local state");
    }

    fn evaluate_prompts(&mut self) {
        let now = self.clock.now();
        let fired = self
            .prompts
            .evaluate(&self.session, &self.settings, self.meta.as_ref(), now);
        for prompt in fired {
            tracing::debug!(%prompt, "prompt due");
            if !self.pending.contains(&prompt) {
                self.pending.push(prompt);
            }
        }
        let visible = self.prompts.flags();
        self.pending.retain(|prompt| visible.get(*prompt));
    }

    fn persist(&self) {
        let record = SessionRecord::from(&self.session);
        if let Err(e) = self.storage.save(&record) {
            tracing::warn!(error = %e, "failed to persist timer state");
        }
    }

    fn notify(&self) {
        self.notifier.send_replace(self.snapshot());
    }

    fn commit(&mut self) {
        self.persist();
        self.evaluate_prompts();
        self.notify();
    }
}

fn build_snapshot(
    session: &Session,
    settings: &BreakSettings,
    meta: Option<&TaskMeta>,
    prompts: PromptFlags,
    remote_failures: u64,
    now: DateTime<Utc>,
) -> TimerSnapshot {
    TimerSnapshot {
        status: session.status(),
        active_task_id: session.active_task_id().map(str::to_owned),
        current_log_id: session.current_log_id().map(str::to_owned),
        readout: readout::compute(session, meta, now),
        prompts,
        settings: *settings,
        work_ms_since_break: session.work_ms_since_break,
        remote_failures,
        at: now,
    }
}
