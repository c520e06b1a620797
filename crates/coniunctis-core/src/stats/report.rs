//! Assembles [`DerivedStats`] from raw session and task rows.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::efficiency::average_efficiency;
use super::rollup::{category_rollup, daily_rollup, CategoryBucket, DailyBucket, TimeRange};
use super::score::{
    completion_rate, productivity_score, ProductivityScore, ScoreInputs, NEUTRAL_EFFICIENCY,
};
use super::streak::{self, Streaks};
use crate::error::GatewayError;
use crate::model::{Session, Task, TaskFilter};
use crate::storage::SessionGateway;
use crate::timer::SessionKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedStats {
    pub range: TimeRange,
    pub generated_at: DateTime<Utc>,
    pub daily: Vec<DailyBucket>,
    pub categories: Vec<CategoryBucket>,
    pub streaks: Streaks,
    /// Focus sessions completed in the range.
    pub total_pomodoros: u32,
    pub focus_minutes: u32,
    /// Tasks touched in the range that are completed, as a fraction.
    pub completion_rate: f64,
    /// Over all tasks, not just the range.
    pub average_efficiency: f64,
    pub productivity: ProductivityScore,
}

/// Pure derivation. `history` must contain every session that should count
/// towards streaks; only those inside `range` feed the rollups and score.
pub fn derive_stats<Tz: TimeZone>(
    history: &[Session],
    tasks: &[Task],
    range: TimeRange,
    now: DateTime<Utc>,
    tz: &Tz,
) -> DerivedStats {
    let today = now.with_timezone(tz).date_naive();
    let in_range: Vec<Session> = history
        .iter()
        .filter(|s| range.contains(s.completed_at.with_timezone(tz).date_naive(), today))
        .cloned()
        .collect();

    let daily = daily_rollup(&in_range, tasks, range, today, tz);
    let categories = category_rollup(&in_range, tasks, range, today, tz);

    let focus: Vec<&Session> = in_range
        .iter()
        .filter(|s| s.kind == SessionKind::Focus)
        .collect();
    let total_pomodoros = focus.len() as u32;
    let focus_minutes = focus.iter().map(|s| s.duration_minutes).sum();

    let window_tasks: Vec<&Task> = tasks
        .iter()
        .filter(|t| range.contains(t.updated_at.with_timezone(tz).date_naive(), today))
        .collect();
    let completed = window_tasks.iter().filter(|t| t.completed).count();
    let rate = completion_rate(completed, window_tasks.len());

    let inputs = ScoreInputs::from_tasks(rate, total_pomodoros, tasks);
    let streaks = streak::calculate(&streak::focus_days(history, tz), today);

    DerivedStats {
        range,
        generated_at: now,
        daily,
        categories,
        streaks,
        total_pomodoros,
        focus_minutes,
        completion_rate: rate,
        average_efficiency: average_efficiency(tasks).unwrap_or(NEUTRAL_EFFICIENCY),
        productivity: productivity_score(&inputs),
    }
}

/// Fetch everything the analytics need through `gateway` and derive them.
///
/// Sessions are read from the Unix epoch so the longest streak sees the
/// whole history.
pub fn build_report<G, Tz>(
    gateway: &G,
    user_id: &str,
    range: TimeRange,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<DerivedStats, GatewayError>
where
    G: SessionGateway + ?Sized,
    Tz: TimeZone,
{
    let history = gateway.fetch_sessions_in_range(
        user_id,
        DateTime::<Utc>::UNIX_EPOCH,
        now + Duration::seconds(1),
    )?;
    let tasks = gateway.fetch_tasks(user_id, TaskFilter::all())?;
    tracing::debug!(
        sessions = history.len(),
        tasks = tasks.len(),
        range = range.as_str(),
        "building analytics report"
    );
    Ok(derive_stats(&history, &tasks, range, now, tz))
}
