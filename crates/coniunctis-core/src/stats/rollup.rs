//! Per-day and per-category rollups over a trailing range.
//!
//! Both rollups are pure functions of their input rows: calling them twice
//! with the same rows yields the same buckets.

use std::collections::{BTreeMap, HashMap};

use chrono::{Duration, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use super::efficiency::average_efficiency;
use crate::error::ValidationError;
use crate::model::{Session, Task};
use crate::timer::SessionKind;

pub const UNCATEGORIZED: &str = "Uncategorized";

/// Colors assigned to category buckets by index.
pub const CATEGORY_PALETTE: [&str; 8] = [
    "#3b82f6", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6", "#ec4899", "#14b8a6", "#f97316",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    #[default]
    Week,
    Month,
    Year,
}

impl TimeRange {
    pub fn days(&self) -> u32 {
        match self {
            TimeRange::Week => 7,
            TimeRange::Month => 30,
            TimeRange::Year => 365,
        }
    }

    /// First calendar day of the range ending on `today` (inclusive).
    pub fn start_date(&self, today: NaiveDate) -> NaiveDate {
        today - Duration::days(i64::from(self.days()) - 1)
    }

    pub fn contains(&self, day: NaiveDate, today: NaiveDate) -> bool {
        day >= self.start_date(today) && day <= today
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Week => "week",
            TimeRange::Month => "month",
            TimeRange::Year => "year",
        }
    }
}

impl std::str::FromStr for TimeRange {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "week" => Ok(TimeRange::Week),
            "month" => Ok(TimeRange::Month),
            "year" => Ok(TimeRange::Year),
            other => Err(ValidationError::invalid(
                "range",
                format!("'{other}' is not one of week, month, year"),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyBucket {
    pub date: NaiveDate,
    pub pomodoro_count: u32,
    pub focus_minutes: u32,
    pub tasks_completed: u32,
    pub efficiency_percent: u32,
}

impl DailyBucket {
    fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            pomodoro_count: 0,
            focus_minutes: 0,
            tasks_completed: 0,
            efficiency_percent: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBucket {
    pub category: String,
    pub color: String,
    pub pomodoro_count: u32,
    pub focus_minutes: u32,
    pub task_count: u32,
}

fn category_of(task: Option<&Task>) -> &str {
    match task {
        Some(t) if !t.category.trim().is_empty() => t.category.trim(),
        _ => UNCATEGORIZED,
    }
}

/// One bucket per calendar day of `range`, oldest first.
pub fn daily_rollup<Tz: TimeZone>(
    sessions: &[Session],
    tasks: &[Task],
    range: TimeRange,
    today: NaiveDate,
    tz: &Tz,
) -> Vec<DailyBucket> {
    let start = range.start_date(today);
    let mut buckets: BTreeMap<NaiveDate, DailyBucket> = start
        .iter_days()
        .take_while(|d| *d <= today)
        .map(|d| (d, DailyBucket::empty(d)))
        .collect();

    for session in sessions.iter().filter(|s| s.kind == SessionKind::Focus) {
        let day = session.completed_at.with_timezone(tz).date_naive();
        if let Some(bucket) = buckets.get_mut(&day) {
            bucket.pomodoro_count += 1;
            bucket.focus_minutes += session.duration_minutes;
        }
    }

    let mut completed_by_day: HashMap<NaiveDate, Vec<&Task>> = HashMap::new();
    for task in tasks.iter().filter(|t| t.completed) {
        let day = task.updated_at.with_timezone(tz).date_naive();
        if buckets.contains_key(&day) {
            completed_by_day.entry(day).or_default().push(task);
        }
    }
    for (day, day_tasks) in completed_by_day {
        if let Some(bucket) = buckets.get_mut(&day) {
            bucket.tasks_completed = day_tasks.len() as u32;
            bucket.efficiency_percent = match average_efficiency(day_tasks.iter().copied()) {
                Some(avg) => (avg * 100.0).round() as u32,
                None => 100,
            };
        }
    }

    buckets.into_values().collect()
}

/// One bucket per category seen in focus sessions (via their task) and in
/// tasks touched during `range`. Sorted by pomodoro count, then minutes,
/// then name.
pub fn category_rollup<Tz: TimeZone>(
    sessions: &[Session],
    tasks: &[Task],
    range: TimeRange,
    today: NaiveDate,
    tz: &Tz,
) -> Vec<CategoryBucket> {
    let by_id: HashMap<&str, &Task> = tasks.iter().map(|t| (t.id.as_str(), t)).collect();
    let mut totals: HashMap<&str, (u32, u32, u32)> = HashMap::new();

    for session in sessions.iter().filter(|s| s.kind == SessionKind::Focus) {
        let day = session.completed_at.with_timezone(tz).date_naive();
        if !range.contains(day, today) {
            continue;
        }
        let task = session.task_id.as_deref().and_then(|id| by_id.get(id).copied());
        let entry = totals.entry(category_of(task)).or_default();
        entry.0 += 1;
        entry.1 += session.duration_minutes;
    }

    for task in tasks {
        let day = task.updated_at.with_timezone(tz).date_naive();
        if range.contains(day, today) {
            totals.entry(category_of(Some(task))).or_default().2 += 1;
        }
    }

    let mut buckets: Vec<CategoryBucket> = totals
        .into_iter()
        .map(|(category, (pomodoro_count, focus_minutes, task_count))| CategoryBucket {
            category: category.to_string(),
            color: String::new(),
            pomodoro_count,
            focus_minutes,
            task_count,
        })
        .collect();
    buckets.sort_by(|a, b| {
        b.pomodoro_count
            .cmp(&a.pomodoro_count)
            .then(b.focus_minutes.cmp(&a.focus_minutes))
            .then_with(|| a.category.cmp(&b.category))
    });
    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.color = CATEGORY_PALETTE[i % CATEGORY_PALETTE.len()].to_string();
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewTask;
    use chrono::{DateTime, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    fn at(days_ago: i64, hour: u32) -> DateTime<Utc> {
        let day = today() - Duration::days(days_ago);
        Utc.from_utc_datetime(&day.and_hms_opt(hour, 0, 0).unwrap())
    }

    fn session(kind: SessionKind, when: DateTime<Utc>, task_id: Option<&str>) -> Session {
        Session {
            id: format!("{when}"),
            kind,
            duration_minutes: if kind == SessionKind::Focus { 25 } else { 5 },
            completed_at: when,
            task_id: task_id.map(str::to_string),
        }
    }

    fn task(id: &str, category: &str, est: u32, actual: u32, done: bool, updated: DateTime<Utc>) -> Task {
        let mut t = NewTask::new(id, est.max(1))
            .with_category(category)
            .into_task(id.to_string(), updated);
        t.estimated_pomodoros = est;
        t.actual_pomodoros = actual;
        t.completed = done;
        t
    }

    #[test]
    fn range_lengths() {
        assert_eq!(TimeRange::Week.days(), 7);
        assert_eq!(TimeRange::Month.days(), 30);
        assert_eq!(TimeRange::Year.days(), 365);
        assert_eq!(TimeRange::Week.start_date(today()), NaiveDate::from_ymd_opt(2024, 5, 4).unwrap());
        assert_eq!("Month".parse::<TimeRange>().unwrap(), TimeRange::Month);
        assert!("fortnight".parse::<TimeRange>().is_err());
    }

    #[test]
    fn empty_input_gives_zeroed_days() {
        let days = daily_rollup(&[], &[], TimeRange::Week, today(), &Utc);
        assert_eq!(days.len(), 7);
        assert!(days.iter().all(|d| d.pomodoro_count == 0 && d.efficiency_percent == 0));
        assert_eq!(days.first().unwrap().date, TimeRange::Week.start_date(today()));
        assert_eq!(days.last().unwrap().date, today());
        assert!(category_rollup(&[], &[], TimeRange::Week, today(), &Utc).is_empty());
    }

    #[test]
    fn daily_counts_focus_only_and_ignores_out_of_range() {
        let sessions = vec![
            session(SessionKind::Focus, at(0, 9), None),
            session(SessionKind::Focus, at(0, 10), None),
            session(SessionKind::ShortBreak, at(0, 11), None),
            session(SessionKind::Focus, at(2, 9), None),
            session(SessionKind::Focus, at(9, 9), None),
        ];
        let days = daily_rollup(&sessions, &[], TimeRange::Week, today(), &Utc);
        let last = days.last().unwrap();
        assert_eq!(last.pomodoro_count, 2);
        assert_eq!(last.focus_minutes, 50);
        assert_eq!(days[4].pomodoro_count, 1);
        assert_eq!(days.iter().map(|d| d.pomodoro_count).sum::<u32>(), 3);
    }

    #[test]
    fn daily_efficiency_conventions() {
        let tasks = vec![
            task("a", "", 2, 2, true, at(0, 12)),
            task("b", "", 4, 2, true, at(0, 13)),
            task("c", "", 0, 3, true, at(1, 12)),
            task("d", "", 2, 2, false, at(2, 12)),
        ];
        let days = daily_rollup(&[], &tasks, TimeRange::Week, today(), &Utc);
        let today_bucket = &days[6];
        assert_eq!(today_bucket.tasks_completed, 2);
        assert_eq!(today_bucket.efficiency_percent, 75);
        // Completed tasks without estimates count as fully efficient.
        assert_eq!(days[5].tasks_completed, 1);
        assert_eq!(days[5].efficiency_percent, 100);
        // Incomplete tasks are not counted.
        assert_eq!(days[4].tasks_completed, 0);
        assert_eq!(days[4].efficiency_percent, 0);
    }

    #[test]
    fn categories_via_linked_task_with_fallback() {
        let tasks = vec![
            task("w", "Writing", 2, 1, false, at(1, 8)),
            task("r", "Research", 1, 0, false, at(20, 8)),
            task("n", "  ", 1, 0, true, at(0, 8)),
        ];
        let sessions = vec![
            session(SessionKind::Focus, at(0, 9), Some("w")),
            session(SessionKind::Focus, at(0, 10), Some("w")),
            session(SessionKind::Focus, at(0, 11), Some("w")),
            session(SessionKind::Focus, at(1, 9), None),
            session(SessionKind::Focus, at(1, 10), Some("deleted")),
            session(SessionKind::Focus, at(2, 10), Some("r")),
            session(SessionKind::LongBreak, at(2, 11), Some("r")),
        ];
        let cats = category_rollup(&sessions, &tasks, TimeRange::Week, today(), &Utc);

        assert_eq!(cats.len(), 3);
        assert_eq!(cats[0].category, "Writing");
        assert_eq!(cats[0].pomodoro_count, 3);
        assert_eq!(cats[0].task_count, 1);
        assert_eq!(cats[0].color, CATEGORY_PALETTE[0]);

        assert_eq!(cats[1].category, UNCATEGORIZED);
        assert_eq!(cats[1].pomodoro_count, 2);
        assert_eq!(cats[1].task_count, 1);

        // Research task itself is outside the range but its session is not.
        assert_eq!(cats[2].category, "Research");
        assert_eq!(cats[2].pomodoro_count, 1);
        assert_eq!(cats[2].focus_minutes, 25);
        assert_eq!(cats[2].task_count, 0);
        assert_eq!(cats[2].color, CATEGORY_PALETTE[2]);
    }

    #[test]
    fn palette_wraps() {
        let tasks: Vec<Task> = (0..10)
            .map(|i| task(&format!("t{i}"), &format!("cat{i:02}"), 1, 0, false, at(0, 8)))
            .collect();
        let cats = category_rollup(&[], &tasks, TimeRange::Week, today(), &Utc);
        assert_eq!(cats.len(), 10);
        assert_eq!(cats[8].color, CATEGORY_PALETTE[0]);
        assert_eq!(cats[9].color, CATEGORY_PALETTE[1]);
    }

    #[test]
    fn rollups_are_idempotent() {
        let tasks = vec![task("w", "Writing", 2, 3, true, at(0, 8))];
        let sessions = vec![
            session(SessionKind::Focus, at(0, 9), Some("w")),
            session(SessionKind::Focus, at(3, 9), None),
        ];
        let first = (
            daily_rollup(&sessions, &tasks, TimeRange::Month, today(), &Utc),
            category_rollup(&sessions, &tasks, TimeRange::Month, today(), &Utc),
        );
        let second = (
            daily_rollup(&sessions, &tasks, TimeRange::Month, today(), &Utc),
            category_rollup(&sessions, &tasks, TimeRange::Month, today(), &Utc),
        );
        assert_eq!(first, second);
    }
}
