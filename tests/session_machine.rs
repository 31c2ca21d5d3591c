#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use timeblock::libs::session::{Phase, Session, Status};
    use timeblock::libs::storage::SessionRecord;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap()
    }

    fn mins(n: i64) -> DateTime<Utc> {
        t0() + Duration::minutes(n)
    }

    #[test]
    fn test_idle_by_default() {
        let session = Session::idle();
        assert_eq!(session.status(), Status::Idle);
        assert!(session.task().is_none());
        assert_eq!(session.total_elapsed_ms(mins(10)), 0);
        assert!(session.totals(mins(10)).is_none());
    }

    #[test]
    fn test_pause_resume_accounting() {
        let mut session = Session::idle();
        session.begin("task-1", Some("log-1".into()), t0());

        assert!(session.pause(mins(5)));
        assert_eq!(session.status(), Status::Paused);
        assert!(session.resume(mins(8)));
        assert_eq!(session.status(), Status::Working);

        let totals = session.totals(mins(10)).unwrap();
        assert_eq!(totals.elapsed_ms, 7 * 60_000);
        assert_eq!(totals.paused_ms, 3 * 60_000);
        assert_eq!(session.work_ms_since_break, 5 * 60_000);
    }

    #[test]
    fn test_resume_when_working_is_noop() {
        let mut session = Session::idle();
        session.begin("task-1", None, t0());
        let before = session.clone();

        assert!(!session.resume(mins(3)));
        assert_eq!(session, before);
    }

    #[test]
    fn test_running_pause_counts_in_totals() {
        let mut session = Session::idle();
        session.begin("task-1", None, t0());
        session.pause(mins(2));

        let totals = session.totals(mins(6)).unwrap();
        assert_eq!(totals.elapsed_ms, 2 * 60_000);
        assert_eq!(totals.paused_ms, 4 * 60_000);
    }

    #[test]
    fn test_stop_resets_to_idle() {
        let mut session = Session::idle();
        session.begin("task-1", Some("log-1".into()), t0());
        session.pause(mins(20));

        let stopped = session.stop(mins(25)).unwrap();
        assert_eq!(stopped.totals.task_id, "task-1");
        assert_eq!(stopped.totals.log_id.as_deref(), Some("log-1"));
        assert_eq!(stopped.totals.elapsed_ms, 20 * 60_000);
        assert_eq!(stopped.totals.paused_ms, 5 * 60_000);
        assert!(stopped.finished_break.is_none());
        assert_eq!(session, Session::idle());
    }

    #[test]
    fn test_stop_when_idle_reports_nothing() {
        let mut session = Session::idle();
        assert!(session.stop(t0()).is_none());
    }

    #[test]
    fn test_stop_on_break_closes_break() {
        let mut session = Session::idle();
        session.begin("task-1", None, t0());
        session.start_break(600_000, mins(30));

        let stopped = session.stop(mins(34)).unwrap();
        let finished = stopped.finished_break.unwrap();
        assert_eq!(finished.started_at, mins(30));
        assert_eq!(finished.ended_at, mins(34));
        assert_eq!(finished.duration_ms, 4 * 60_000);
        assert_eq!(stopped.totals.elapsed_ms, 30 * 60_000);
    }

    #[test]
    fn test_break_requires_task() {
        let mut session = Session::idle();
        assert!(!session.start_break(600_000, t0()));
        assert!(session.is_idle());
    }

    #[test]
    fn test_resume_from_break_accounts_pause() {
        let mut session = Session::idle();
        session.begin("task-1", None, t0());
        session.work_ms_since_break = 10 * 60_000;
        session.start_break(600_000, mins(50));
        assert_eq!(session.work_ms_since_break, 0);

        let finished = session.resume_from_break(mins(60)).unwrap();
        assert_eq!(finished.duration_ms, 10 * 60_000);
        assert_eq!(session.status(), Status::Working);
        assert_eq!(session.started_at(), Some(mins(60)));
        assert_eq!(session.task().unwrap().paused_ms, 10 * 60_000);
        assert_eq!(session.task().unwrap().elapsed_ms, 50 * 60_000);
    }

    #[test]
    fn test_resume_from_break_when_not_on_break() {
        let mut session = Session::idle();
        session.begin("task-1", None, t0());
        assert!(session.resume_from_break(mins(1)).is_none());
        assert_eq!(session.status(), Status::Working);
    }

    #[test]
    fn test_extend_with_amount_is_additive() {
        let mut session = Session::idle();
        session.begin("task-1", None, t0());
        session.start_break(2 * 60_000, t0());

        assert!(session.extend_break(Some(5 * 60_000), mins(1)));
        assert_eq!(session.break_duration_ms(), Some(7 * 60_000));
        assert_eq!(session.break_started_at(), Some(t0()));
    }

    #[test]
    fn test_extend_before_deadline_restarts_from_now() {
        let mut session = Session::idle();
        session.begin("task-1", None, t0());
        session.start_break(10 * 60_000, t0());

        assert!(session.extend_break(None, mins(4)));
        assert_eq!(session.break_duration_ms(), Some(14 * 60_000));
    }

    #[test]
    fn test_extend_outside_break_is_rejected() {
        let mut session = Session::idle();
        session.begin("task-1", None, t0());
        assert!(!session.extend_break(Some(60_000), mins(1)));
        assert_eq!(session.break_duration_ms(), None);
    }

    #[test]
    fn test_adopt_replaces_phase() {
        let mut session = Session::idle();
        session.adopt("task-9", "log-9".into(), mins(-15), 30_000);

        assert_eq!(session.status(), Status::Working);
        assert_eq!(session.current_log_id(), Some("log-9"));
        assert_eq!(session.total_elapsed_ms(t0()), 15 * 60_000);
        assert_eq!(session.task().unwrap().paused_ms, 30_000);
    }

    #[test]
    fn test_record_round_trip_on_break() {
        let mut session = Session::idle();
        session.begin("task-1", Some("log-1".into()), t0());
        session.pause(mins(10));
        session.resume(mins(12));
        session.start_break(600_000, mins(40));

        let record = SessionRecord::from(&session);
        assert!(record.is_on_break);
        assert!(!record.is_paused);
        assert_eq!(record.elapsed_ms, 38 * 60_000);
        assert_eq!(record.paused_ms, 2 * 60_000);

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"activeTaskId\":\"task-1\""));
        assert!(json.contains("\"isOnBreak\":true"));

        let restored: SessionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.into_session(mins(99)), session);
    }

    #[test]
    fn test_record_without_task_is_idle() {
        let record = SessionRecord {
            is_paused: true,
            is_on_break: true,
            work_ms_since_break: 42,
            ..SessionRecord::default()
        };

        let session = record.into_session(t0());
        assert!(session.is_idle());
        assert_eq!(session.work_ms_since_break, 42);
    }

    #[test]
    fn test_legacy_record_fills_missing_fields() {
        let json = r#"{"activeTaskId":"task-1","currentLogId":"log-1","elapsedMs":1000}"#;
        let record: SessionRecord = serde_json::from_str(json).unwrap();

        let session = record.into_session(t0());
        match session.phase {
            Phase::Working { ref task, started_at } => {
                assert_eq!(task.elapsed_ms, 1000);
                assert_eq!(started_at, t0());
            }
            ref other => panic!("expected working, got {:?}", other),
        }
        assert_eq!(session.work_ms_since_break, 0);
    }

    #[test]
    fn test_break_flag_wins_over_pause_flag() {
        let record = SessionRecord {
            active_task_id: Some("task-1".into()),
            is_paused: true,
            is_on_break: true,
            pause_started_at: Some(mins(1)),
            break_started_at: Some(mins(2)),
            break_duration_ms: 60_000,
            ..SessionRecord::default()
        };

        let session = record.into_session(mins(3));
        assert_eq!(session.status(), Status::OnBreak);
        assert_eq!(session.pause_started_at(), Some(mins(1)));
    }
}
