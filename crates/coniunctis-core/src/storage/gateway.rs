//! Persistence contracts consumed by the timer and the analytics.
//!
//! The store behind them is external (a hosted database in production, SQLite
//! for the CLI, memory in tests). Implementations own access control: every
//! call is scoped to a `user_id`.

use chrono::{DateTime, Utc};

use crate::error::GatewayError;
use crate::model::{NewSession, Session, Task, TaskFilter};
use crate::settings::PomodoroSettings;

pub trait SessionGateway {
    /// Append a completed session. Returns the id assigned by the store.
    fn insert_session(&self, user_id: &str, session: &NewSession) -> Result<String, GatewayError>;

    /// Add exactly one to the task's `actual_pomodoros`.
    fn increment_task_actual_pomodoros(&self, user_id: &str, task_id: &str)
        -> Result<(), GatewayError>;

    /// `Ok(None)` when the user has never saved settings.
    fn load_settings(&self, user_id: &str) -> Result<Option<PomodoroSettings>, GatewayError>;

    /// Insert or update the user's single settings row.
    fn save_settings(&self, user_id: &str, settings: &PomodoroSettings)
        -> Result<(), GatewayError>;

    /// Sessions with `start <= completed_at < end`, oldest first.
    fn fetch_sessions_in_range(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Session>, GatewayError>;

    fn fetch_tasks(&self, user_id: &str, filter: TaskFilter) -> Result<Vec<Task>, GatewayError>;
}

/// Task lifecycle operations used by the shell.
pub trait TaskStore {
    fn insert_task(&self, user_id: &str, task: &Task) -> Result<(), GatewayError>;

    fn get_task(&self, user_id: &str, task_id: &str) -> Result<Option<Task>, GatewayError>;

    /// Set the completed flag and bump `updated_at`. Returns the updated row.
    fn set_task_completed(
        &self,
        user_id: &str,
        task_id: &str,
        completed: bool,
        at: DateTime<Utc>,
    ) -> Result<Task, GatewayError>;

    fn delete_task(&self, user_id: &str, task_id: &str) -> Result<(), GatewayError>;
}

impl<T: SessionGateway + ?Sized> SessionGateway for &T {
    fn insert_session(&self, user_id: &str, session: &NewSession) -> Result<String, GatewayError> {
        (**self).insert_session(user_id, session)
    }

    fn increment_task_actual_pomodoros(
        &self,
        user_id: &str,
        task_id: &str,
    ) -> Result<(), GatewayError> {
        (**self).increment_task_actual_pomodoros(user_id, task_id)
    }

    fn load_settings(&self, user_id: &str) -> Result<Option<PomodoroSettings>, GatewayError> {
        (**self).load_settings(user_id)
    }

    fn save_settings(
        &self,
        user_id: &str,
        settings: &PomodoroSettings,
    ) -> Result<(), GatewayError> {
        (**self).save_settings(user_id, settings)
    }

    fn fetch_sessions_in_range(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Session>, GatewayError> {
        (**self).fetch_sessions_in_range(user_id, start, end)
    }

    fn fetch_tasks(&self, user_id: &str, filter: TaskFilter) -> Result<Vec<Task>, GatewayError> {
        (**self).fetch_tasks(user_id, filter)
    }
}
