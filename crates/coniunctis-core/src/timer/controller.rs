//! Drives a [`TimerEngine`] and turns its completions into persisted records.
//!
//! Each completion is applied at most once: the controller remembers the
//! highest `sequence` it has handled and ignores anything at or below it.
//! Writes that fail go to the [`Outbox`] and the timer keeps running.

use chrono::{DateTime, Utc};

use super::engine::{EngineCheckpoint, TimerEngine};
use super::kind::SessionKind;
use crate::error::CoreError;
use crate::events::Event;
use crate::model::NewSession;
use crate::notifier::Notifier;
use crate::settings::PomodoroSettings;
use crate::storage::{FlushReport, Outbox, PendingWrite, SessionGateway};

pub struct CycleController<G, N> {
    engine: TimerEngine,
    gateway: G,
    notifier: N,
    outbox: Outbox,
    user_id: String,
    last_applied: u64,
}

impl<G: SessionGateway, N: Notifier> CycleController<G, N> {
    pub fn new(
        engine: TimerEngine,
        gateway: G,
        notifier: N,
        outbox: Outbox,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            engine,
            gateway,
            notifier,
            outbox,
            user_id: user_id.into(),
            last_applied: 0,
        }
    }

    /// Load the user's settings from the store and restore `checkpoint`.
    ///
    /// Missing or unreadable settings fall back to `fallback`; the timer
    /// must come up even when the store is down.
    pub fn bootstrap(
        gateway: G,
        notifier: N,
        outbox: Outbox,
        user_id: impl Into<String>,
        checkpoint: EngineCheckpoint,
        fallback: PomodoroSettings,
    ) -> Self {
        let user_id = user_id.into();
        let settings = match gateway.load_settings(&user_id) {
            Ok(Some(settings)) => settings,
            Ok(None) => fallback,
            Err(e) => {
                tracing::warn!("could not load settings, using defaults: {e}");
                fallback
            }
        };
        let engine = TimerEngine::restore(settings, checkpoint);
        Self::new(engine, gateway, notifier, outbox, user_id)
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn checkpoint(&self) -> EngineCheckpoint {
        self.engine.checkpoint()
    }

    /// Hand the checkpoint to `save`. A failure is logged and reported to the
    /// notifier but never interrupts the cycle. Returns whether it was saved.
    pub fn persist_checkpoint<E, F>(&self, save: F) -> bool
    where
        E: std::fmt::Display,
        F: FnOnce(&EngineCheckpoint) -> Result<(), E>,
    {
        match save(&self.checkpoint()) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(user = %self.user_id, "timer checkpoint not saved: {e}");
                self.notifier
                    .persistence_failed(&format!("timer position not saved: {e}"));
                false
            }
        }
    }

    pub fn snapshot(&self) -> Event {
        self.engine.snapshot()
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        self.engine.start()
    }

    pub fn pause(&mut self) -> Option<Event> {
        self.engine.pause()
    }

    pub fn toggle(&mut self) -> Option<Event> {
        self.engine.toggle()
    }

    pub fn reset(&mut self) -> Event {
        self.engine.reset()
    }

    pub fn skip(&mut self) -> Event {
        self.engine.skip()
    }

    pub fn set_active_task(&mut self, task_id: Option<String>) -> Event {
        self.engine.set_active_task(task_id)
    }

    /// Validate, persist, then apply to the engine. Nothing changes if the
    /// store rejects the write.
    pub fn save_settings(&mut self, settings: PomodoroSettings) -> Result<(), CoreError> {
        settings.validate()?;
        self.gateway.save_settings(&self.user_id, &settings)?;
        self.engine.apply_settings(settings);
        Ok(())
    }

    pub fn tick(&mut self) -> Option<Event> {
        self.tick_at(Utc::now())
    }

    pub fn tick_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        let event = self.engine.tick_at(now)?;
        self.handle_completion(&event);
        Some(event)
    }

    /// Persist a completion and notify. Returns `false` for anything that is
    /// not a new completion.
    pub fn handle_completion(&mut self, event: &Event) -> bool {
        let Event::SessionCompleted {
            sequence,
            kind,
            duration_min,
            task_id,
            next_kind,
            at,
            ..
        } = event
        else {
            return false;
        };
        if *sequence <= self.last_applied {
            tracing::debug!(sequence, "ignoring already applied completion");
            return false;
        }
        self.last_applied = *sequence;

        self.flush_outbox();

        let session = NewSession {
            kind: *kind,
            duration_minutes: *duration_min,
            completed_at: *at,
            task_id: task_id.clone(),
        };
        self.write_or_queue(PendingWrite::InsertSession {
            user_id: self.user_id.clone(),
            session,
        });

        if let (SessionKind::Focus, Some(task_id)) = (kind, task_id) {
            self.write_or_queue(PendingWrite::IncrementTask {
                user_id: self.user_id.clone(),
                task_id: task_id.clone(),
            });
        }

        if self.engine.settings().sound_enabled {
            self.notifier.play_completion_sound(*kind);
        }
        self.notifier.session_completed(*kind, *next_kind);
        tracing::info!(
            sequence,
            kind = kind.as_str(),
            duration_min,
            task = task_id.as_deref().unwrap_or("-"),
            "session completed"
        );
        true
    }

    /// Replay queued writes. Failures are logged, never returned.
    pub fn flush_outbox(&mut self) -> FlushReport {
        if self.outbox.is_empty() {
            return FlushReport::default();
        }
        match self.outbox.flush(&self.gateway) {
            Ok(report) => {
                if report.applied > 0 {
                    tracing::info!(
                        applied = report.applied,
                        remaining = report.remaining,
                        "replayed queued writes"
                    );
                }
                report
            }
            Err(e) => {
                tracing::error!("outbox flush failed: {e}");
                FlushReport {
                    remaining: self.outbox.len(),
                    ..FlushReport::default()
                }
            }
        }
    }

    /// Queued writes must land first, so a non-empty outbox takes the new
    /// write without trying the store.
    fn write_or_queue(&mut self, write: PendingWrite) {
        if self.outbox.is_empty() {
            match write.apply(&self.gateway) {
                Ok(()) => return,
                Err(e) if !e.is_transient() => {
                    tracing::warn!("store rejected write, not retrying: {e}");
                    self.notifier
                        .persistence_failed(&format!("write rejected: {e}"));
                    return;
                }
                Err(e) => {
                    tracing::warn!("write failed, queued for retry: {e}");
                    self.notifier
                        .persistence_failed(&format!("saved offline, will retry: {e}"));
                }
            }
        }
        if let Err(e) = self.outbox.push(write) {
            tracing::error!("could not queue write: {e}");
        }
    }
}
