//! SQLite-backed gateway.
//!
//! Provides persistent storage for:
//! - Completed sessions (append-only)
//! - Tasks and their pomodoro counters
//! - Per-user Pomodoro settings
//! - Key-value store for application state (active task pointer, timer checkpoint)
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings so that
//! lexicographic order in SQL equals chronological order.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::data_dir;
use super::gateway::{SessionGateway, TaskStore};
use super::migrations;
use crate::error::{DatabaseError, GatewayError};
use crate::model::{NewSession, Priority, Session, Task, TaskFilter};
use crate::settings::PomodoroSettings;
use crate::timer::SessionKind;

/// SQLite database for sessions, tasks and settings.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data dir>/coniunctis.db`.
    ///
    /// # Errors
    /// Returns an error if the data directory is unavailable or the database
    /// cannot be opened or migrated.
    pub fn open() -> crate::error::Result<Self> {
        let path = data_dir()?.join("coniunctis.db");
        Ok(Self::open_at(path)?)
    }

    /// Open (creating if needed) the database file at `path`.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, DatabaseError> {
        migrations::migrate(&conn).map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn kv_delete(&self, key: &str) -> Result<(), DatabaseError> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

const TASK_COLUMNS: &str = "id, title, completed, priority, category, estimated_pomodoros,
     actual_pomodoros, created_at, updated_at";

fn format_ts(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_ts(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn session_from_row(row: &Row<'_>) -> rusqlite::Result<Session> {
    Ok(Session {
        id: row.get(0)?,
        kind: SessionKind::from_label(&row.get::<_, String>(1)?),
        duration_minutes: row.get(2)?,
        completed_at: parse_ts(row, 3)?,
        task_id: row.get(4)?,
    })
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        completed: row.get(2)?,
        priority: Priority::from_label(&row.get::<_, String>(3)?),
        category: row.get(4)?,
        estimated_pomodoros: row.get(5)?,
        actual_pomodoros: row.get(6)?,
        created_at: parse_ts(row, 7)?,
        updated_at: parse_ts(row, 8)?,
    })
}

fn task_not_found(task_id: &str) -> GatewayError {
    GatewayError::NotFound {
        entity: "task",
        id: task_id.to_string(),
    }
}

impl SessionGateway for Database {
    fn insert_session(&self, user_id: &str, session: &NewSession) -> Result<String, GatewayError> {
        let id = Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO sessions (id, user_id, kind, duration_min, completed_at, task_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                id,
                user_id,
                session.kind.as_str(),
                session.duration_minutes,
                format_ts(session.completed_at),
                session.task_id,
            ],
        )?;
        Ok(id)
    }

    fn increment_task_actual_pomodoros(
        &self,
        user_id: &str,
        task_id: &str,
    ) -> Result<(), GatewayError> {
        let changed = self.conn.execute(
            "UPDATE tasks
             SET actual_pomodoros = actual_pomodoros + 1, updated_at = ?3
             WHERE id = ?1 AND user_id = ?2",
            params![task_id, user_id, format_ts(Utc::now())],
        )?;
        if changed == 0 {
            return Err(task_not_found(task_id));
        }
        Ok(())
    }

    fn load_settings(&self, user_id: &str) -> Result<Option<PomodoroSettings>, GatewayError> {
        let settings = self
            .conn
            .query_row(
                "SELECT focus_duration, short_break_duration, long_break_duration,
                        sound_enabled, auto_start_breaks, auto_start_focus
                 FROM pomodoro_settings WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok(PomodoroSettings {
                        focus_duration: row.get(0)?,
                        short_break_duration: row.get(1)?,
                        long_break_duration: row.get(2)?,
                        sound_enabled: row.get(3)?,
                        auto_start_breaks: row.get(4)?,
                        auto_start_focus: row.get(5)?,
                    })
                },
            )
            .optional()?;
        Ok(settings)
    }

    fn save_settings(
        &self,
        user_id: &str,
        settings: &PomodoroSettings,
    ) -> Result<(), GatewayError> {
        self.conn.execute(
            "INSERT INTO pomodoro_settings (
                user_id, focus_duration, short_break_duration, long_break_duration,
                sound_enabled, auto_start_breaks, auto_start_focus, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(user_id) DO UPDATE SET
                focus_duration = excluded.focus_duration,
                short_break_duration = excluded.short_break_duration,
                long_break_duration = excluded.long_break_duration,
                sound_enabled = excluded.sound_enabled,
                auto_start_breaks = excluded.auto_start_breaks,
                auto_start_focus = excluded.auto_start_focus,
                updated_at = excluded.updated_at",
            params![
                user_id,
                settings.focus_duration,
                settings.short_break_duration,
                settings.long_break_duration,
                settings.sound_enabled,
                settings.auto_start_breaks,
                settings.auto_start_focus,
                format_ts(Utc::now()),
            ],
        )?;
        Ok(())
    }

    fn fetch_sessions_in_range(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Session>, GatewayError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, kind, duration_min, completed_at, task_id
             FROM sessions
             WHERE user_id = ?1 AND completed_at >= ?2 AND completed_at < ?3
             ORDER BY completed_at ASC",
        )?;
        let rows = stmt.query_map(
            params![user_id, format_ts(start), format_ts(end)],
            session_from_row,
        )?;
        let sessions = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(sessions)
    }

    fn fetch_tasks(&self, user_id: &str, filter: TaskFilter) -> Result<Vec<Task>, GatewayError> {
        let tasks = match filter.completed {
            Some(completed) => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {TASK_COLUMNS} FROM tasks
                     WHERE user_id = ?1 AND completed = ?2
                     ORDER BY created_at ASC"
                ))?;
                let rows = stmt.query_map(params![user_id, completed], task_from_row)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
            None => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {TASK_COLUMNS} FROM tasks
                     WHERE user_id = ?1
                     ORDER BY created_at ASC"
                ))?;
                let rows = stmt.query_map(params![user_id], task_from_row)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
        };
        Ok(tasks)
    }
}

impl TaskStore for Database {
    fn insert_task(&self, user_id: &str, task: &Task) -> Result<(), GatewayError> {
        self.conn.execute(
            "INSERT INTO tasks (
                id, user_id, title, completed, priority, category,
                estimated_pomodoros, actual_pomodoros, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                task.id,
                user_id,
                task.title,
                task.completed,
                task.priority.as_str(),
                task.category,
                task.estimated_pomodoros,
                task.actual_pomodoros,
                format_ts(task.created_at),
                format_ts(task.updated_at),
            ],
        )?;
        Ok(())
    }

    fn get_task(&self, user_id: &str, task_id: &str) -> Result<Option<Task>, GatewayError> {
        let task = self
            .conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1 AND user_id = ?2"),
                params![task_id, user_id],
                task_from_row,
            )
            .optional()?;
        Ok(task)
    }

    fn set_task_completed(
        &self,
        user_id: &str,
        task_id: &str,
        completed: bool,
        at: DateTime<Utc>,
    ) -> Result<Task, GatewayError> {
        let changed = self.conn.execute(
            "UPDATE tasks SET completed = ?3, updated_at = ?4 WHERE id = ?1 AND user_id = ?2",
            params![task_id, user_id, completed, format_ts(at)],
        )?;
        if changed == 0 {
            return Err(task_not_found(task_id));
        }
        self.get_task(user_id, task_id)?
            .ok_or_else(|| task_not_found(task_id))
    }

    fn delete_task(&self, user_id: &str, task_id: &str) -> Result<(), GatewayError> {
        let changed = self.conn.execute(
            "DELETE FROM tasks WHERE id = ?1 AND user_id = ?2",
            params![task_id, user_id],
        )?;
        if changed == 0 {
            return Err(task_not_found(task_id));
        }
        Ok(())
    }
}
