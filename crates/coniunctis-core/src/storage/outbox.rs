//! Durable queue of gateway writes that failed.
//!
//! The timer never waits on the store: when a completion cannot be written
//! the write is parked here and replayed later. An entry leaves the queue
//! only after the store confirms it, or when the store reports that it can
//! never succeed (e.g. the task was deleted in the meantime).

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::gateway::SessionGateway;
use crate::error::{CoreError, GatewayError};
use crate::model::NewSession;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PendingWrite {
    InsertSession { user_id: String, session: NewSession },
    IncrementTask { user_id: String, task_id: String },
}

impl PendingWrite {
    pub(crate) fn apply<G: SessionGateway + ?Sized>(&self, gateway: &G) -> Result<(), GatewayError> {
        match self {
            PendingWrite::InsertSession { user_id, session } => {
                gateway.insert_session(user_id, session).map(|_| ())
            }
            PendingWrite::IncrementTask { user_id, task_id } => {
                gateway.increment_task_actual_pomodoros(user_id, task_id)
            }
        }
    }
}

/// Outcome of a [`Outbox::flush`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FlushReport {
    pub applied: usize,
    /// Entries discarded because the store rejected them permanently.
    pub dropped: usize,
    pub remaining: usize,
}

#[derive(Debug, Default)]
pub struct Outbox {
    entries: VecDeque<PendingWrite>,
    /// `None` keeps the queue in memory only.
    path: Option<PathBuf>,
}

impl Outbox {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the queue persisted at `path`, starting empty if the file is absent.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => VecDeque::new(),
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => VecDeque::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            entries,
            path: Some(path),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &PendingWrite> {
        self.entries.iter()
    }

    pub fn push(&mut self, write: PendingWrite) -> Result<(), CoreError> {
        self.entries.push_back(write);
        self.persist()
    }

    /// Replay queued writes in order. Stops at the first transient failure so
    /// that ordering is preserved.
    pub fn flush<G: SessionGateway + ?Sized>(&mut self, gateway: &G) -> Result<FlushReport, CoreError> {
        let mut report = FlushReport::default();
        while let Some(front) = self.entries.front() {
            match front.apply(gateway) {
                Ok(()) => {
                    report.applied += 1;
                    self.entries.pop_front();
                }
                Err(e) if e.is_transient() => {
                    tracing::debug!("outbox flush paused: {e}");
                    break;
                }
                Err(e) => {
                    tracing::warn!("dropping outbox entry rejected by store: {e}");
                    report.dropped += 1;
                    self.entries.pop_front();
                }
            }
        }
        report.remaining = self.entries.len();
        if report.applied > 0 || report.dropped > 0 {
            self.persist()?;
        }
        Ok(report)
    }

    fn persist(&self) -> Result<(), CoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewTask;
    use crate::storage::{InMemoryGateway, TaskStore};
    use crate::timer::SessionKind;
    use chrono::{Duration, Utc};

    fn pending_session() -> PendingWrite {
        PendingWrite::InsertSession {
            user_id: "u1".into(),
            session: NewSession {
                kind: SessionKind::Focus,
                duration_minutes: 25,
                completed_at: Utc::now(),
                task_id: None,
            },
        }
    }

    #[test]
    fn flush_keeps_entries_while_offline() {
        let gw = InMemoryGateway::new();
        gw.set_offline(true);
        let mut outbox = Outbox::in_memory();
        outbox.push(pending_session()).unwrap();

        let report = outbox.flush(&gw).unwrap();
        assert_eq!(report, FlushReport { applied: 0, dropped: 0, remaining: 1 });

        gw.set_offline(false);
        let report = outbox.flush(&gw).unwrap();
        assert_eq!(report.applied, 1);
        assert!(outbox.is_empty());
        assert_eq!(gw.session_count(), 1);
    }

    #[test]
    fn entries_list_queue_in_order() {
        let mut outbox = Outbox::in_memory();
        outbox.push(pending_session()).unwrap();
        outbox
            .push(PendingWrite::IncrementTask {
                user_id: "u1".into(),
                task_id: "t1".into(),
            })
            .unwrap();
        let ops: Vec<_> = outbox
            .entries()
            .map(|w| matches!(w, PendingWrite::IncrementTask { .. }))
            .collect();
        assert_eq!(ops, vec![false, true]);
    }

    #[test]
    fn permanent_failure_is_dropped() {
        let gw = InMemoryGateway::new();
        let mut outbox = Outbox::in_memory();
        outbox
            .push(PendingWrite::IncrementTask {
                user_id: "u1".into(),
                task_id: "deleted".into(),
            })
            .unwrap();
        outbox.push(pending_session()).unwrap();

        let report = outbox.flush(&gw).unwrap();
        assert_eq!(report.dropped, 1);
        assert_eq!(report.applied, 1);
    }

    #[test]
    fn increment_replays_once() {
        let gw = InMemoryGateway::new();
        let task = NewTask::new("Essay", 2).into_task("t-1".into(), Utc::now());
        gw.insert_task("u1", &task).unwrap();

        let mut outbox = Outbox::in_memory();
        outbox
            .push(PendingWrite::IncrementTask {
                user_id: "u1".into(),
                task_id: "t-1".into(),
            })
            .unwrap();
        outbox.flush(&gw).unwrap();
        outbox.flush(&gw).unwrap();
        assert_eq!(gw.get_task("u1", "t-1").unwrap().unwrap().actual_pomodoros, 1);
    }

    #[test]
    fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outbox.json");
        {
            let mut outbox = Outbox::open(&path).unwrap();
            outbox.push(pending_session()).unwrap();
        }
        let mut reopened = Outbox::open(&path).unwrap();
        assert_eq!(reopened.len(), 1);

        let gw = InMemoryGateway::new();
        reopened.flush(&gw).unwrap();
        assert!(Outbox::open(&path).unwrap().is_empty());

        let sessions = gw
            .fetch_sessions_in_range("u1", Utc::now() - Duration::hours(1), Utc::now() + Duration::hours(1))
            .unwrap();
        assert_eq!(sessions.len(), 1);
    }
}
