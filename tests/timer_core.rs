#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use std::sync::Arc;
    use test_context::{test_context, AsyncTestContext};
    use timeblock::db::store::SqliteStore;
    use timeblock::libs::clock::{Clock, ManualClock};
    use timeblock::libs::prompts::Prompt;
    use timeblock::libs::readout::ReadoutMode;
    use timeblock::libs::remote::{BreakSettings, BreakSettingsUpdate};
    use timeblock::libs::session::Status;
    use timeblock::libs::storage::{MemorySessionStorage, SessionRecord, SessionStorage};
    use timeblock::libs::task::Task;
    use timeblock::libs::timer::TimerCore;

    const USER: &str = "user-1";

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap()
    }

    /// A timer wired to an in-memory store, in-memory session storage and a
    /// manual clock; each piece is shared so tests can inspect it.
    struct TimerTestContext {
        clock: ManualClock,
        store: SqliteStore,
        storage: MemorySessionStorage,
    }

    impl AsyncTestContext for TimerTestContext {
        async fn setup() -> Self {
            TimerTestContext {
                clock: ManualClock::new(t0()),
                store: SqliteStore::in_memory().unwrap(),
                storage: MemorySessionStorage::new(),
            }
        }
    }

    impl TimerTestContext {
        async fn core(&self) -> TimerCore {
            self.core_with_storage(self.storage.clone()).await
        }

        async fn core_with_storage(&self, storage: MemorySessionStorage) -> TimerCore {
            let mut core = TimerCore::new(
                Arc::new(self.store.clone()),
                Box::new(storage),
                Arc::new(self.clock.clone()),
                Some(USER.to_string()),
            );
            core.bootstrap().await;
            core
        }

        fn now(&self) -> DateTime<Utc> {
            self.clock.now()
        }

        fn add_task(&self, name: &str, estimate_secs: i64) -> String {
            let task = Task::new(USER, name, estimate_secs);
            self.store.add_task(&task).unwrap();
            task.id
        }
    }

    #[test_context(TimerTestContext)]
    #[tokio::test]
    async fn test_fresh_core_is_idle(ctx: &mut TimerTestContext) {
        let core = ctx.core().await;
        let snapshot = core.snapshot();

        assert_eq!(snapshot.status, Status::Idle);
        assert_eq!(snapshot.readout.mode, ReadoutMode::Idle);
        assert_eq!(snapshot.display(), "00:00:00");
        assert!(!snapshot.prompts.any());
        assert_eq!(*core.settings(), BreakSettings::default());
    }

    #[test_context(TimerTestContext)]
    #[tokio::test]
    async fn test_pause_resume_totals_on_closed_log(ctx: &mut TimerTestContext) {
        let task_id = ctx.add_task("Write report", 0);
        let mut core = ctx.core().await;

        assert!(core.start(&task_id).await);
        let log_id = core.session().current_log_id().unwrap().to_string();

        ctx.clock.advance_mins(5);
        assert!(core.pause());
        ctx.clock.advance_mins(3);
        assert!(core.resume());
        ctx.clock.advance_mins(2);
        assert!(core.stop(0).await);

        let log = ctx.store.time_log(&log_id).unwrap().unwrap();
        assert!(!log.is_open());
        assert_eq!(log.duration_actual, Some(7 * 60));
        assert_eq!(log.paused_ms, 3 * 60_000);
        assert_eq!(log.overtime_duration, None);
        assert_eq!(core.remote_failures(), 0);
    }

    #[test_context(TimerTestContext)]
    #[tokio::test]
    async fn test_stop_persists_exact_idle_state(ctx: &mut TimerTestContext) {
        let task_id = ctx.add_task("Write report", 0);
        let mut core = ctx.core().await;

        core.start(&task_id).await;
        ctx.clock.advance_mins(10);
        core.pause();
        core.stop(0).await;

        assert!(core.session().is_idle());
        assert_eq!(core.session().work_ms_since_break, 0);
        assert_eq!(ctx.storage.load().unwrap(), Some(SessionRecord::default()));
    }

    #[test_context(TimerTestContext)]
    #[tokio::test]
    async fn test_stop_when_idle_does_nothing(ctx: &mut TimerTestContext) {
        let mut core = ctx.core().await;
        assert!(!core.stop(0).await);
        assert!(ctx.store.recent_logs(USER, 10).unwrap().is_empty());
    }

    #[test_context(TimerTestContext)]
    #[tokio::test]
    async fn test_start_closes_previous_log_and_keeps_cadence(ctx: &mut TimerTestContext) {
        let first = ctx.add_task("First", 0);
        let second = ctx.add_task("Second", 0);
        let mut core = ctx.core().await;

        core.start(&first).await;
        let first_log = core.session().current_log_id().unwrap().to_string();
        ctx.clock.advance_mins(10);
        core.pause();
        core.resume();
        ctx.clock.advance_mins(2);

        assert!(core.start(&second).await);

        let closed = ctx.store.time_log(&first_log).unwrap().unwrap();
        assert!(!closed.is_open());
        assert_eq!(closed.duration_actual, Some(12 * 60));

        let logs = ctx.store.recent_logs(USER, 10).unwrap();
        assert_eq!(logs.iter().filter(|log| log.is_open()).count(), 1);
        assert_eq!(core.session().active_task_id(), Some(second.as_str()));
        assert_eq!(core.session().task().unwrap().elapsed_ms, 0);
        assert_eq!(core.session().work_ms_since_break, 10 * 60_000);
    }

    #[test_context(TimerTestContext)]
    #[tokio::test]
    async fn test_start_without_user_is_ignored(ctx: &mut TimerTestContext) {
        let mut core = TimerCore::new(
            Arc::new(ctx.store.clone()),
            Box::new(ctx.storage.clone()),
            Arc::new(ctx.clock.clone()),
            None,
        );
        core.bootstrap().await;

        assert!(!core.start("task-1").await);
        assert!(core.session().is_idle());
    }

    #[test_context(TimerTestContext)]
    #[tokio::test]
    async fn test_immediate_break_resume_records_zero_length_break(ctx: &mut TimerTestContext) {
        let task_id = ctx.add_task("Write report", 0);
        let mut core = ctx.core().await;

        core.start(&task_id).await;
        assert!(core.take_break());
        assert!(core.resume_from_break().await);

        let breaks = ctx.store.recent_breaks(USER, 10).unwrap();
        assert_eq!(breaks.len(), 1);
        assert_eq!(breaks[0].duration_ms, 0);
        assert_eq!(core.session().status(), Status::Working);
    }

    #[test_context(TimerTestContext)]
    #[tokio::test]
    async fn test_extend_break_is_additive(ctx: &mut TimerTestContext) {
        let task_id = ctx.add_task("Write report", 0);
        let mut core = ctx.core().await;

        core.start(&task_id).await;
        core.start_break(2 * 60_000);
        assert!(core.extend_break(Some(5 * 60_000)));
        assert_eq!(core.session().break_duration_ms(), Some(7 * 60_000));

        ctx.clock.advance_mins(3);
        assert!(core.tick().fired.is_empty());
        assert_eq!(core.snapshot().display(), "00:04:00");

        ctx.clock.advance_mins(4);
        assert_eq!(core.tick().fired, vec![Prompt::BreakEnd]);
    }

    #[test_context(TimerTestContext)]
    #[tokio::test]
    async fn test_break_cadence_scenario(ctx: &mut TimerTestContext) {
        let task_id = ctx.add_task("Deep work", 0);
        let mut core = ctx.core().await;

        core.start(&task_id).await;
        ctx.clock.advance_mins(49);
        assert!(core.tick().fired.is_empty());

        ctx.clock.advance_mins(1);
        let outcome = core.tick();
        assert_eq!(outcome.fired, vec![Prompt::BreakDue]);
        assert!(outcome.alert);

        assert!(core.start_break(600_000));
        assert_eq!(core.session().status(), Status::OnBreak);
        assert_eq!(core.session().break_started_at(), Some(ctx.now()));
        assert!(!core.prompts().break_due);

        ctx.clock.advance_mins(10);
        assert_eq!(core.tick().fired, vec![Prompt::BreakEnd]);

        assert!(core.resume_from_break().await);
        let breaks = ctx.store.recent_breaks(USER, 10).unwrap();
        assert_eq!(breaks[0].duration_ms, 600_000);
        assert_eq!(core.session().status(), Status::Working);
        assert_eq!(core.session().work_ms_since_break, 0);
        assert!(!core.prompts().any());
    }

    #[test_context(TimerTestContext)]
    #[tokio::test]
    async fn test_estimate_overrun_shows_negative_readout(ctx: &mut TimerTestContext) {
        let task_id = ctx.add_task("Estimated", 1800);
        let mut core = ctx.core().await;

        core.start(&task_id).await;
        ctx.clock.advance_secs(600);
        assert_eq!(core.snapshot().readout.mode, ReadoutMode::TaskCountdown);
        assert_eq!(core.snapshot().display(), "00:20:00");

        ctx.clock.advance_secs(1300);
        assert_eq!(core.snapshot().display(), "-00:01:40");
        assert_eq!(core.overtime_secs(), 100);
    }

    #[test_context(TimerTestContext)]
    #[tokio::test]
    async fn test_finish_overtime_records_overrun(ctx: &mut TimerTestContext) {
        let task_id = ctx.add_task("Estimated", 1800);
        let mut core = ctx.core().await;

        core.start(&task_id).await;
        let log_id = core.session().current_log_id().unwrap().to_string();
        ctx.clock.advance_secs(1900);
        assert!(core.tick().fired.contains(&Prompt::Overtime));

        assert!(core.finish_overtime().await);
        let log = ctx.store.time_log(&log_id).unwrap().unwrap();
        assert_eq!(log.duration_actual, Some(1900));
        assert_eq!(log.overtime_duration, Some(100));
        assert!(core.session().is_idle());
    }

    #[test_context(TimerTestContext)]
    #[tokio::test]
    async fn test_prior_logs_count_against_estimate(ctx: &mut TimerTestContext) {
        let task_id = ctx.add_task("Estimated", 1800);
        let mut core = ctx.core().await;

        core.start(&task_id).await;
        ctx.clock.advance_mins(20);
        core.stop(0).await;

        core.start(&task_id).await;
        assert_eq!(core.meta().unwrap().prior_logged_secs, 1200);
        ctx.clock.advance_mins(5);
        assert_eq!(core.snapshot().display(), "00:05:00");
    }

    #[test_context(TimerTestContext)]
    #[tokio::test]
    async fn test_reload_restores_session(ctx: &mut TimerTestContext) {
        let task_id = ctx.add_task("Write report", 0);
        let mut core = ctx.core().await;

        core.start(&task_id).await;
        ctx.clock.advance_mins(15);
        core.pause();
        let before = core.session().clone();
        drop(core);

        ctx.clock.advance_mins(1);
        let restored = ctx.core().await;
        assert_eq!(*restored.session(), before);
        assert_eq!(restored.snapshot().display(), "00:15:00");
    }

    #[test_context(TimerTestContext)]
    #[tokio::test]
    async fn test_corrupt_state_falls_back_to_idle(ctx: &mut TimerTestContext) {
        let storage = MemorySessionStorage::with_raw("{\"activeTaskId\": ");
        let mut core = ctx.core_with_storage(storage.clone()).await;

        assert!(core.session().is_idle());

        let task_id = ctx.add_task("Write report", 0);
        core.start(&task_id).await;
        let record = storage.load().unwrap().unwrap();
        assert_eq!(record.active_task_id.as_deref(), Some(task_id.as_str()));
    }

    #[test_context(TimerTestContext)]
    #[tokio::test]
    async fn test_bootstrap_loads_stored_settings(ctx: &mut TimerTestContext) {
        let settings = BreakSettings {
            break_every_mins: 25,
            break_duration_mins: 5,
            long_pause_mins: 15,
        };
        ctx.store.save_break_settings(USER, &settings).unwrap();

        let core = ctx.core().await;
        assert_eq!(*core.settings(), settings);
    }

    #[test_context(TimerTestContext)]
    #[tokio::test]
    async fn test_settings_update_applies_immediately(ctx: &mut TimerTestContext) {
        let task_id = ctx.add_task("Write report", 0);
        let mut core = ctx.core().await;

        core.start(&task_id).await;
        ctx.clock.advance_mins(30);
        assert!(core.tick().fired.is_empty());

        core.update_break_settings(BreakSettingsUpdate {
            break_every_mins: Some(25),
            ..BreakSettingsUpdate::default()
        });
        assert!(core.prompts().break_due);
        assert_eq!(core.settings().break_duration_mins, 10);
        assert_eq!(core.tick().fired, vec![Prompt::BreakDue]);
    }

    #[test_context(TimerTestContext)]
    #[tokio::test]
    async fn test_subscribers_see_every_change(ctx: &mut TimerTestContext) {
        let task_id = ctx.add_task("Write report", 0);
        let mut core = ctx.core().await;
        let mut rx = core.subscribe();

        core.start(&task_id).await;
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().status, Status::Working);

        core.pause();
        assert_eq!(rx.borrow_and_update().status, Status::Paused);
    }
}
