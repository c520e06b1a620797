//! Estimate-vs-actual efficiency of tasks.
//!
//! One convention everywhere: a task without an estimate has no efficiency
//! and is left out of averages. Callers choose the default for "nothing to
//! average".

use crate::model::Task;

/// Ratio above which over-runs stop counting.
pub const EFFICIENCY_CAP: f64 = 2.0;

/// `actual / estimated`, capped at [`EFFICIENCY_CAP`]. `None` without an estimate.
pub fn task_efficiency(estimated: u32, actual: u32) -> Option<f64> {
    if estimated == 0 {
        return None;
    }
    Some((f64::from(actual) / f64::from(estimated)).min(EFFICIENCY_CAP))
}

/// Mean efficiency of the tasks that carry an estimate.
pub fn average_efficiency<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Option<f64> {
    let (sum, count) = tasks
        .into_iter()
        .filter_map(|t| task_efficiency(t.estimated_pomodoros, t.actual_pomodoros))
        .fold((0.0, 0u32), |(sum, count), e| (sum + e, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / f64::from(count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewTask;
    use chrono::Utc;

    fn task(estimated: u32, actual: u32) -> Task {
        let mut t = NewTask::new("t", 1).into_task(format!("{estimated}/{actual}"), Utc::now());
        t.estimated_pomodoros = estimated;
        t.actual_pomodoros = actual;
        t
    }

    #[test]
    fn ratio_is_capped() {
        assert_eq!(task_efficiency(2, 1), Some(0.5));
        assert_eq!(task_efficiency(1, 5), Some(EFFICIENCY_CAP));
        assert_eq!(task_efficiency(0, 3), None);
    }

    #[test]
    fn tasks_without_estimates_are_excluded() {
        let tasks = vec![task(2, 2), task(4, 2), task(0, 9)];
        assert_eq!(average_efficiency(&tasks), Some(0.75));
    }

    #[test]
    fn nothing_to_average() {
        assert_eq!(average_efficiency(&Vec::new()), None);
        assert_eq!(average_efficiency(&vec![task(0, 1)]), None);
    }
}
