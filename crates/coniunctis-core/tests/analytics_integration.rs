//! Integration tests for the analytics report.
//!
//! Sessions and tasks are written through the SQLite gateway and read back
//! by `build_report`, the same path the CLI uses.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use coniunctis_core::stats::{
    category_rollup, daily_rollup, productivity_score, ProductivityLevel, ScoreInputs, Streaks,
};
use coniunctis_core::{
    build_report, Database, NewSession, NewTask, SessionGateway, SessionKind, TaskStore, TimeRange,
};

fn noon(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(12, 0, 0).unwrap())
}

fn record(db: &Database, kind: SessionKind, at: DateTime<Utc>, task_id: Option<&str>) {
    db.insert_session(
        "local",
        &NewSession {
            kind,
            duration_minutes: match kind {
                SessionKind::Focus => 25,
                SessionKind::ShortBreak => 5,
                SessionKind::LongBreak => 15,
            },
            completed_at: at,
            task_id: task_id.map(str::to_string),
        },
    )
    .unwrap();
}

#[test]
fn test_streaks_over_consecutive_days() {
    let db = Database::open_memory().unwrap();
    let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    for offset in 0..3 {
        record(&db, SessionKind::Focus, noon(d + Duration::days(offset)), None);
    }
    let now = noon(d + Duration::days(2)) + Duration::hours(6);

    let report = build_report(&db, "local", TimeRange::Week, now, &Utc).unwrap();
    assert_eq!(report.streaks, Streaks { current: 3, longest: 3 });
}

#[test]
fn test_streaks_with_gap() {
    let db = Database::open_memory().unwrap();
    let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    for offset in [0, 1, 5, 6, 7] {
        record(&db, SessionKind::Focus, noon(d + Duration::days(offset)), None);
    }
    // Breaks never count towards a streak.
    record(&db, SessionKind::ShortBreak, noon(d + Duration::days(3)), None);
    let now = noon(d + Duration::days(7));

    let report = build_report(&db, "local", TimeRange::Month, now, &Utc).unwrap();
    assert_eq!(report.streaks, Streaks { current: 3, longest: 3 });
}

#[test]
fn test_empty_store_degrades_to_defaults() {
    let db = Database::open_memory().unwrap();
    let report = build_report(&db, "local", TimeRange::Year, Utc::now(), &Utc).unwrap();
    assert_eq!(report.streaks, Streaks { current: 0, longest: 0 });
    assert_eq!(report.daily.len(), 365);
    assert!(report.daily.iter().all(|b| b.pomodoro_count == 0));
    assert_eq!(report.completion_rate, 0.0);
    assert_eq!(report.average_efficiency, 1.0);
}

#[test]
fn test_week_with_one_task_scores_good() {
    let db = Database::open_memory().unwrap();
    let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
    let now = noon(today) + Duration::hours(8);

    let mut task = NewTask::new("Chapter", 7)
        .with_category("Writing")
        .into_task("t1".into(), noon(today - Duration::days(6)));
    task.completed = true;
    task.actual_pomodoros = 7;
    task.updated_at = noon(today);
    db.insert_task("local", &task).unwrap();

    for offset in 0..7 {
        record(&db, SessionKind::Focus, noon(today - Duration::days(offset)), Some("t1"));
    }

    let report = build_report(&db, "local", TimeRange::Week, now, &Utc).unwrap();
    assert_eq!(report.total_pomodoros, 7);
    assert_eq!(report.focus_minutes, 175);
    assert_eq!(report.completion_rate, 1.0);
    assert_eq!(report.productivity.score, 64);
    assert_eq!(report.productivity.level, ProductivityLevel::Good);

    assert_eq!(report.categories.len(), 1);
    assert_eq!(report.categories[0].category, "Writing");
    assert_eq!(report.categories[0].pomodoro_count, 7);
    assert_eq!(report.categories[0].focus_minutes, 175);

    let last = report.daily.last().unwrap();
    assert_eq!(last.date, today);
    assert_eq!(last.tasks_completed, 1);
}

#[test]
fn test_score_reference_case() {
    let score = productivity_score(&ScoreInputs {
        completion_rate: 1.0,
        total_pomodoros: 7,
        average_efficiency: 1.0,
    });
    assert_eq!(score.score, 64);
    assert_eq!(score.level, ProductivityLevel::Good);
}

#[test]
fn test_rollups_are_idempotent() {
    let db = Database::open_memory().unwrap();
    let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
    for offset in 0..4 {
        record(&db, SessionKind::Focus, noon(today - Duration::days(offset)), None);
        record(&db, SessionKind::ShortBreak, noon(today - Duration::days(offset)), None);
    }
    let sessions = db
        .fetch_sessions_in_range("local", DateTime::<Utc>::UNIX_EPOCH, noon(today) + Duration::days(1))
        .unwrap();

    let first = daily_rollup(&sessions, &[], TimeRange::Week, today, &Utc);
    let second = daily_rollup(&sessions, &[], TimeRange::Week, today, &Utc);
    assert_eq!(first, second);
    assert_eq!(first.iter().map(|b| b.pomodoro_count).sum::<u32>(), 4);

    let cats_a = category_rollup(&sessions, &[], TimeRange::Week, today, &Utc);
    let cats_b = category_rollup(&sessions, &[], TimeRange::Week, today, &Utc);
    assert_eq!(cats_a, cats_b);
}
