//! Task operations shared by every shell.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{CoreError, GatewayError};
use crate::model::{NewTask, Task, TaskFilter};
use crate::storage::{SessionGateway, TaskStore};

/// Validate `new` and store it under a fresh id.
pub fn create_task<S: TaskStore + ?Sized>(
    store: &S,
    user_id: &str,
    new: NewTask,
    now: DateTime<Utc>,
) -> Result<Task, CoreError> {
    new.validate()?;
    let task = new.into_task(Uuid::new_v4().to_string(), now);
    store.insert_task(user_id, &task)?;
    tracing::info!(id = %task.id, title = %task.title, "task created");
    Ok(task)
}

pub fn get_task<S: TaskStore + ?Sized>(
    store: &S,
    user_id: &str,
    task_id: &str,
) -> Result<Task, CoreError> {
    store
        .get_task(user_id, task_id)?
        .ok_or_else(|| not_found(task_id).into())
}

/// Flip the completed flag.
pub fn toggle_task<S: TaskStore + ?Sized>(
    store: &S,
    user_id: &str,
    task_id: &str,
    now: DateTime<Utc>,
) -> Result<Task, CoreError> {
    let current = get_task(store, user_id, task_id)?;
    set_completed(store, user_id, task_id, !current.completed, now)
}

pub fn set_completed<S: TaskStore + ?Sized>(
    store: &S,
    user_id: &str,
    task_id: &str,
    completed: bool,
    now: DateTime<Utc>,
) -> Result<Task, CoreError> {
    let task = store.set_task_completed(user_id, task_id, completed, now)?;
    tracing::debug!(id = task_id, completed, "task updated");
    Ok(task)
}

pub fn delete_task<S: TaskStore + ?Sized>(
    store: &S,
    user_id: &str,
    task_id: &str,
) -> Result<(), CoreError> {
    store.delete_task(user_id, task_id)?;
    tracing::info!(id = task_id, "task deleted");
    Ok(())
}

/// Tasks matching `filter`, newest first.
pub fn list_tasks<G: SessionGateway + ?Sized>(
    gateway: &G,
    user_id: &str,
    filter: TaskFilter,
) -> Result<Vec<Task>, CoreError> {
    let mut tasks = gateway.fetch_tasks(user_id, filter)?;
    tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.title.cmp(&b.title)));
    Ok(tasks)
}

fn not_found(task_id: &str) -> GatewayError {
    GatewayError::NotFound {
        entity: "task",
        id: task_id.to_string(),
    }
}
