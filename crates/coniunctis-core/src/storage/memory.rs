//! In-memory gateway.
//!
//! Used by tests and by shells that keep everything in process. Writes can be
//! switched off with [`InMemoryGateway::set_offline`] to exercise the
//! transient-failure path.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::gateway::{SessionGateway, TaskStore};
use crate::error::GatewayError;
use crate::model::{NewSession, Session, Task, TaskFilter};
use crate::settings::PomodoroSettings;

#[derive(Debug, Default)]
struct State {
    sessions: Vec<(String, Session)>,
    tasks: Vec<(String, Task)>,
    settings: HashMap<String, PomodoroSettings>,
}

#[derive(Debug, Default)]
pub struct InMemoryGateway {
    state: Mutex<State>,
    offline: AtomicBool,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every write fails with [`GatewayError::Unavailable`].
    /// Reads keep working.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn session_count(&self) -> usize {
        self.lock().sessions.len()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_online(&self) -> Result<(), GatewayError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(GatewayError::Unavailable("in-memory store is offline".into()));
        }
        Ok(())
    }

    fn with_task<R>(
        &self,
        user_id: &str,
        task_id: &str,
        f: impl FnOnce(&mut Task) -> R,
    ) -> Result<R, GatewayError> {
        let mut state = self.lock();
        let task = state
            .tasks
            .iter_mut()
            .find(|(owner, t)| owner == user_id && t.id == task_id)
            .map(|(_, t)| t)
            .ok_or_else(|| GatewayError::NotFound {
                entity: "task",
                id: task_id.to_string(),
            })?;
        Ok(f(task))
    }
}

impl SessionGateway for InMemoryGateway {
    fn insert_session(&self, user_id: &str, session: &NewSession) -> Result<String, GatewayError> {
        self.check_online()?;
        let id = Uuid::new_v4().to_string();
        self.lock()
            .sessions
            .push((user_id.to_string(), session.clone().into_session(id.clone())));
        Ok(id)
    }

    fn increment_task_actual_pomodoros(
        &self,
        user_id: &str,
        task_id: &str,
    ) -> Result<(), GatewayError> {
        self.check_online()?;
        self.with_task(user_id, task_id, |task| {
            task.actual_pomodoros = task.actual_pomodoros.saturating_add(1);
            task.updated_at = Utc::now();
        })
    }

    fn load_settings(&self, user_id: &str) -> Result<Option<PomodoroSettings>, GatewayError> {
        Ok(self.lock().settings.get(user_id).cloned())
    }

    fn save_settings(
        &self,
        user_id: &str,
        settings: &PomodoroSettings,
    ) -> Result<(), GatewayError> {
        self.check_online()?;
        self.lock()
            .settings
            .insert(user_id.to_string(), settings.clone());
        Ok(())
    }

    fn fetch_sessions_in_range(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Session>, GatewayError> {
        let mut sessions: Vec<Session> = self
            .lock()
            .sessions
            .iter()
            .filter(|(owner, s)| owner == user_id && s.completed_at >= start && s.completed_at < end)
            .map(|(_, s)| s.clone())
            .collect();
        sessions.sort_by_key(|s| s.completed_at);
        Ok(sessions)
    }

    fn fetch_tasks(&self, user_id: &str, filter: TaskFilter) -> Result<Vec<Task>, GatewayError> {
        Ok(self
            .lock()
            .tasks
            .iter()
            .filter(|(owner, t)| owner == user_id && filter.matches(t))
            .map(|(_, t)| t.clone())
            .collect())
    }
}

impl TaskStore for InMemoryGateway {
    fn insert_task(&self, user_id: &str, task: &Task) -> Result<(), GatewayError> {
        self.check_online()?;
        self.lock().tasks.push((user_id.to_string(), task.clone()));
        Ok(())
    }

    fn get_task(&self, user_id: &str, task_id: &str) -> Result<Option<Task>, GatewayError> {
        Ok(self
            .lock()
            .tasks
            .iter()
            .find(|(owner, t)| owner == user_id && t.id == task_id)
            .map(|(_, t)| t.clone()))
    }

    fn set_task_completed(
        &self,
        user_id: &str,
        task_id: &str,
        completed: bool,
        at: DateTime<Utc>,
    ) -> Result<Task, GatewayError> {
        self.check_online()?;
        self.with_task(user_id, task_id, |task| {
            task.completed = completed;
            task.updated_at = at;
            task.clone()
        })
    }

    fn delete_task(&self, user_id: &str, task_id: &str) -> Result<(), GatewayError> {
        self.check_online()?;
        let mut state = self.lock();
        let before = state.tasks.len();
        state
            .tasks
            .retain(|(owner, t)| !(owner == user_id && t.id == task_id));
        if state.tasks.len() == before {
            return Err(GatewayError::NotFound {
                entity: "task",
                id: task_id.to_string(),
            });
        }
        Ok(())
    }
}
