//! Integration tests for the timer-to-dashboard workflow.
//!
//! Sessions flow from the timer engine into a store, and the dashboard is
//! computed from the store's snapshot.

use std::sync::Arc;

use chrono::{DateTime, Days, Local, NaiveDate, TimeZone, Utc};
use focusflow_core::stats::{
    current_streak_days, day_key, minutes_on_day, session_count_on_day,
    top_tasks_by_focus_minutes,
};
use focusflow_core::{
    DashboardSummary, Database, FocusSession, MemorySessionStore, MemoryTaskStore, Mode,
    SessionStore, SessionWriter, Task, TaskStore, TickOutcome, TimerConfig, TimerEngine,
};

fn local_time(day: NaiveDate, hour: u32) -> DateTime<Utc> {
    Local
        .from_local_datetime(&day.and_hms_opt(hour, 0, 0).unwrap())
        .earliest()
        .unwrap()
        .with_timezone(&Utc)
}

fn run_cycle(engine: &mut TimerEngine, at: DateTime<Utc>) -> Mode {
    engine.start();
    loop {
        if let TickOutcome::Completed(done) = engine.tick_at(at) {
            return done.finished;
        }
    }
}

#[test]
fn scenario_three_focus_two_break_today() {
    let today = Local::now().date_naive();
    let store = MemorySessionStore::new();
    let tasks = MemoryTaskStore::new(vec![
        Task {
            id: 1,
            title: "Write spec".into(),
            completed: false,
        },
        Task {
            id: 2,
            title: "Untouched".into(),
            completed: false,
        },
    ]);

    let at = |hour| local_time(today, hour);
    for session in [
        FocusSession::new(Some(1), Mode::Focus, 600, at(9)),
        FocusSession::new(None, Mode::Break, 300, at(9)),
        FocusSession::new(Some(1), Mode::Focus, 300, at(10)),
        FocusSession::new(None, Mode::Break, 300, at(10)),
        FocusSession::new(None, Mode::Focus, 600, at(11)),
    ] {
        store.append(&session).unwrap();
    }

    let sessions = store.list_all().unwrap();
    let tasks = tasks.list_all().unwrap();

    assert_eq!(minutes_on_day(&sessions, today), 25);
    assert_eq!(session_count_on_day(&sessions, today), 3);

    let top = top_tasks_by_focus_minutes(&sessions, &tasks, 5);
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].title, "Write spec");
    assert_eq!(top[0].minutes, 15.0);
}

#[test]
fn scenario_three_day_streak() {
    let today = NaiveDate::from_ymd_opt(2024, 6, 12).unwrap();
    let sessions: Vec<FocusSession> = (0..3)
        .map(|back| {
            let day = today.checked_sub_days(Days::new(back)).unwrap();
            FocusSession::new(None, Mode::Focus, 1500, local_time(day, 14))
        })
        .collect();
    assert_eq!(current_streak_days(&sessions, today), 3);
}

#[test]
fn engine_cycles_land_in_sqlite_and_feed_dashboard() {
    let db = Arc::new(Database::open_memory().unwrap());
    let task = db.create_task("Write spec").unwrap();

    let mut engine = TimerEngine::new(
        TimerConfig::new(1, 1).unwrap(),
        SessionWriter::inline(db.clone()),
    );
    engine.select_task(Some(task.id)).unwrap();

    let now = Utc::now();
    let mut finished = Vec::new();
    for _ in 0..4 {
        finished.push(run_cycle(&mut engine, now));
    }
    assert_eq!(
        finished,
        vec![Mode::Focus, Mode::Break, Mode::Focus, Mode::Break]
    );

    let sessions = SessionStore::list_all(db.as_ref()).unwrap();
    assert_eq!(sessions.len(), 2);
    assert!(sessions.iter().all(|s| s.mode == Mode::Focus));
    assert!(sessions.iter().all(|s| s.duration_seconds == 60));
    assert!(sessions.iter().all(|s| s.task_id == Some(task.id)));

    let tasks = TaskStore::list_all(db.as_ref()).unwrap();
    let summary = DashboardSummary::compute(&sessions, &tasks, now, 5);
    assert_eq!(summary.today, day_key(now));
    assert_eq!(summary.today_sessions, 2);
    assert_eq!(summary.today_minutes, 2);
    assert_eq!(summary.streak_days, 1);
    assert_eq!(summary.top_tasks[0].minutes, 2.0);
}

#[test]
fn unknown_task_id_is_recorded_but_not_ranked() {
    let store = Arc::new(MemorySessionStore::new());
    let mut engine = TimerEngine::new(
        TimerConfig::new(1, 1).unwrap(),
        SessionWriter::inline(store.clone()),
    );
    engine.select_task(Some(404)).unwrap();
    run_cycle(&mut engine, Utc::now());

    let sessions = store.list_all().unwrap();
    assert_eq!(sessions[0].task_id, Some(404));
    assert!(top_tasks_by_focus_minutes(&sessions, &[], 5).is_empty());
}

#[test]
fn clear_all_empties_every_aggregate() {
    let db = Database::open_memory().unwrap();
    let now = Utc::now();
    db.append(&FocusSession::new(Some(1), Mode::Focus, 1500, now))
        .unwrap();
    db.clear_all().unwrap();

    let sessions = SessionStore::list_all(&db).unwrap();
    assert!(sessions.is_empty());

    let summary = DashboardSummary::compute(&sessions, &[], now, 5);
    assert_eq!(summary.today_minutes, 0);
    assert_eq!(summary.today_sessions, 0);
    assert_eq!(summary.streak_days, 0);
    assert!(summary.top_tasks.is_empty());
}
