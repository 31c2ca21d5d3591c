#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use rusqlite::Connection;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};
    use timeblock::db::break_logs::BreakLogs;
    use timeblock::db::break_settings::BreakSettingsRepo;
    use timeblock::db::db::Db;
    use timeblock::db::migrations::{get_db_version, init_with_migrations, needs_migration, MigrationManager};
    use timeblock::db::store::SqliteStore;
    use timeblock::db::tasks::Tasks;
    use timeblock::db::time_logs::TimeLogs;
    use timeblock::libs::data_storage::DataStorage;
    use timeblock::libs::remote::{BreakSettings, SessionStore, StoreError};
    use timeblock::libs::task::{Task, TaskFilter};

    const USER: &str = "user-1";

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap()
    }

    struct DbTestContext {
        _temp_dir: TempDir,
        db: Db,
    }

    impl TestContext for DbTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let db = Db::with_storage(&DataStorage::with_base(temp_dir.path())).unwrap();

            DbTestContext { _temp_dir: temp_dir, db }
        }
    }

    #[test]
    fn test_migrations_bring_schema_up_to_date() {
        let mut conn = Connection::open_in_memory().unwrap();
        init_with_migrations(&mut conn).unwrap();
        let manager = MigrationManager::new();
        assert_eq!(get_db_version(&conn).unwrap(), manager.latest_version());
        assert!(!needs_migration(&conn).unwrap());

        let history = manager.get_migration_history(&conn).unwrap();
        assert_eq!(history.len() as u32, manager.latest_version());
        assert_eq!(history[0].0, 1);
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        init_with_migrations(&mut conn).unwrap();
        init_with_migrations(&mut conn).unwrap();

        let manager = MigrationManager::new();
        assert_eq!(manager.get_migration_history(&conn).unwrap().len() as u32, manager.latest_version());
    }

    #[test_context(DbTestContext)]
    #[test]
    fn test_tasks_crud(ctx: &mut DbTestContext) {
        let tasks = Tasks::new(&ctx.db.conn);
        let report = Task::new(USER, "Report", 1800);
        let review = Task::new(USER, "Review", 0);
        tasks.insert(&report).unwrap();
        tasks.insert(&review).unwrap();
        tasks.insert(&Task::new("user-2", "Elsewhere", 0)).unwrap();

        assert_eq!(tasks.fetch(USER, TaskFilter::All).unwrap().len(), 2);
        assert_eq!(tasks.estimate(&report.id).unwrap(), Some(1800));
        assert_eq!(tasks.estimate("missing").unwrap(), None);

        assert!(tasks.set_finished(&review.id, true).unwrap());
        assert!(!tasks.set_finished("missing", true).unwrap());

        let open = tasks.fetch(USER, TaskFilter::Open).unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id, report.id);

        let by_id = tasks.fetch(USER, TaskFilter::ByIds(vec![review.id.clone()])).unwrap();
        assert_eq!(by_id.len(), 1);
        assert!(by_id[0].finished);
    }

    #[test_context(DbTestContext)]
    #[test]
    fn test_time_log_lifecycle(ctx: &mut DbTestContext) {
        let logs = TimeLogs::new(&ctx.db.conn);

        let first = logs.open(USER, "task-1", t0()).unwrap();
        assert!(first.is_open());
        assert_eq!(logs.fetch_open(USER).unwrap().unwrap().id, first.id);

        let closed = logs
            .close(&first.id, t0() + Duration::minutes(30), 1500, 300_000, 0)
            .unwrap()
            .unwrap();
        assert_eq!(closed.duration_actual, Some(1500));
        assert_eq!(closed.overtime_duration, None);
        assert_eq!(closed.paused_ms, 300_000);
        assert!(logs.fetch_open(USER).unwrap().is_none());

        let second = logs.open(USER, "task-1", t0() + Duration::hours(1)).unwrap();
        logs.close(&second.id, t0() + Duration::hours(2), 3600, 0, 120).unwrap();

        assert_eq!(logs.prior_seconds("task-1").unwrap(), 1500 + 3600 + 120);
        assert_eq!(logs.prior_seconds("task-2").unwrap(), 0);

        let recent = logs.fetch_recent(USER, 10).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id, second.id);
        assert!(logs.close("missing", t0(), 1, 0, 0).unwrap().is_none());
        assert!(logs.close(&first.id, t0(), 1, 0, 0).unwrap().is_none());
        assert_eq!(logs.get(&first.id).unwrap().unwrap().duration_actual, Some(1500));
    }

    #[test_context(DbTestContext)]
    #[test]
    fn test_open_logs_do_not_count_as_prior(ctx: &mut DbTestContext) {
        let logs = TimeLogs::new(&ctx.db.conn);
        logs.open(USER, "task-1", t0()).unwrap();
        assert_eq!(logs.prior_seconds("task-1").unwrap(), 0);
    }

    #[test_context(DbTestContext)]
    #[test]
    fn test_break_logs_newest_first(ctx: &mut DbTestContext) {
        let breaks = BreakLogs::new(&ctx.db.conn);
        breaks
            .insert(USER, t0(), t0() + Duration::minutes(10), 600_000)
            .unwrap();
        breaks
            .insert(USER, t0() + Duration::hours(1), t0() + Duration::hours(1), 0)
            .unwrap();

        let recent = breaks.fetch_recent(USER, 10).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].duration_ms, 0);
        assert_eq!(recent[1].duration_ms, 600_000);
        assert!(breaks.fetch_recent("user-2", 10).unwrap().is_empty());
    }

    #[test_context(DbTestContext)]
    #[test]
    fn test_break_settings_upsert(ctx: &mut DbTestContext) {
        let repo = BreakSettingsRepo::new(&ctx.db.conn);
        assert!(repo.fetch(USER).unwrap().is_none());

        repo.save(USER, &BreakSettings::default()).unwrap();
        let changed = BreakSettings {
            break_every_mins: 25,
            ..BreakSettings::default()
        };
        repo.save(USER, &changed).unwrap();

        assert_eq!(repo.fetch(USER).unwrap(), Some(changed));
    }

    #[tokio::test]
    async fn test_store_contract() {
        let store = SqliteStore::in_memory().unwrap();
        let task = Task::new(USER, "Report", 900);
        store.add_task(&task).unwrap();

        let log_id = store.start_log(USER, &task.id, t0()).await.unwrap();
        let open = store.fetch_open_log(USER).await.unwrap().unwrap();
        assert_eq!(open.id, log_id);
        assert_eq!(open.task_id, task.id);
        assert_eq!(open.started_at, t0());

        store
            .stop_log(&log_id, t0() + Duration::minutes(20), 1200, 0, 300)
            .await
            .unwrap();
        assert!(store.fetch_open_log(USER).await.unwrap().is_none());
        assert_eq!(store.prior_logged_seconds(&task.id).await.unwrap(), 1500);
        assert_eq!(store.fetch_task_estimate(&task.id).await.unwrap(), Some(900));
        assert_eq!(store.fetch_break_settings(USER).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_stop_unknown_log_is_an_error() {
        let store = SqliteStore::in_memory().unwrap();
        let result = store.stop_log("missing", t0(), 0, 0, 0).await;
        assert!(matches!(result, Err(StoreError::LogNotFound(id)) if id == "missing"));
    }

    #[tokio::test]
    async fn test_closed_log_cannot_be_closed_again() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("timeblock.db");
        let first = SqliteStore::new(Db::open(&path).unwrap());
        let second = SqliteStore::new(Db::open(&path).unwrap());

        let log_id = first.start_log(USER, "task-1", t0()).await.unwrap();
        assert_eq!(second.fetch_open_log(USER).await.unwrap().unwrap().id, log_id);

        second
            .stop_log(&log_id, t0() + Duration::minutes(10), 600, 0, 0)
            .await
            .unwrap();
        let result = first
            .stop_log(&log_id, t0() + Duration::hours(1), 3600, 0, 0)
            .await;
        assert!(matches!(result, Err(StoreError::LogClosed(id)) if id == log_id));

        let log = first.fetch_log(&log_id).await.unwrap().unwrap();
        assert_eq!(log.duration_actual, Some(600));
        assert_eq!(log.ended_at, Some(t0() + Duration::minutes(10)));
        assert!(first.fetch_log("missing").await.unwrap().is_none());
    }

    #[test]
    fn test_file_database_persists_between_opens() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = DataStorage::with_base(temp_dir.path());

        let store = SqliteStore::new(Db::with_storage(&storage).unwrap());
        store.add_task(&Task::new(USER, "Kept", 0)).unwrap();
        drop(store);

        let reopened = SqliteStore::new(Db::with_storage(&storage).unwrap());
        assert_eq!(reopened.tasks(USER, TaskFilter::All).unwrap().len(), 1);
    }
}
