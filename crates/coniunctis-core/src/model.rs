//! Rows exchanged with the persistence gateway: sessions and tasks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::timer::SessionKind;

/// A completed session. Append-only: never updated once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub kind: SessionKind,
    pub duration_minutes: u32,
    pub completed_at: DateTime<Utc>,
    /// `None` for untracked sessions.
    pub task_id: Option<String>,
}

/// A session about to be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSession {
    pub kind: SessionKind,
    pub duration_minutes: u32,
    pub completed_at: DateTime<Utc>,
    pub task_id: Option<String>,
}

impl NewSession {
    pub fn into_session(self, id: String) -> Session {
        Session {
            id,
            kind: self.kind,
            duration_minutes: self.duration_minutes,
            completed_at: self.completed_at,
            task_id: self.task_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// Unknown values read back from storage map to `Medium`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "low" => Priority::Low,
            "high" => Priority::High,
            _ => Priority::Medium,
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(ValidationError::invalid(
                "priority",
                format!("'{other}' is not one of low, medium, high"),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub priority: Priority,
    /// Free-form; empty means uncategorized.
    #[serde(default)]
    pub category: String,
    pub estimated_pomodoros: u32,
    /// Incremented by one per linked focus completion. Never reset.
    pub actual_pomodoros: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task. Validated before it reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub category: String,
    pub estimated_pomodoros: u32,
}

impl NewTask {
    pub fn new(title: impl Into<String>, estimated_pomodoros: u32) -> Self {
        Self {
            title: title.into(),
            priority: Priority::default(),
            category: String::new(),
            estimated_pomodoros,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::invalid("title", "must not be empty"));
        }
        if self.estimated_pomodoros == 0 {
            return Err(ValidationError::invalid(
                "estimated_pomodoros",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    pub fn into_task(self, id: String, now: DateTime<Utc>) -> Task {
        Task {
            id,
            title: self.title.trim().to_string(),
            completed: false,
            priority: self.priority,
            category: self.category.trim().to_string(),
            estimated_pomodoros: self.estimated_pomodoros,
            actual_pomodoros: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Filter for [`fetch_tasks`](crate::storage::SessionGateway::fetch_tasks).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub completed: Option<bool>,
}

impl TaskFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.completed.map_or(true, |c| task.completed == c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_task_rejects_zero_estimate() {
        let err = NewTask::new("Write intro", 0).validate().unwrap_err();
        assert!(err.to_string().contains("estimated_pomodoros"));
    }

    #[test]
    fn new_task_rejects_blank_title() {
        assert!(NewTask::new("   ", 2).validate().is_err());
    }

    #[test]
    fn into_task_starts_incomplete_with_zero_actual() {
        let now = Utc::now();
        let task = NewTask::new("  Outline chapter ", 3)
            .with_category(" Writing ")
            .with_priority(Priority::High)
            .into_task("t-1".into(), now);
        assert_eq!(task.title, "Outline chapter");
        assert_eq!(task.category, "Writing");
        assert!(!task.completed);
        assert_eq!(task.actual_pomodoros, 0);
        assert_eq!(task.created_at, now);
    }

    #[test]
    fn priority_parsing() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert!("urgent".parse::<Priority>().is_err());
        assert_eq!(Priority::from_label("???"), Priority::Medium);
    }

    #[test]
    fn filter_matches() {
        let mut task = NewTask::new("a", 1).into_task("t".into(), Utc::now());
        assert!(TaskFilter::all().matches(&task));
        assert!(TaskFilter::completed(false).matches(&task));
        task.completed = true;
        assert!(!TaskFilter::completed(false).matches(&task));
    }
}
