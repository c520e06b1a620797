//! Timer engine implementation.
//!
//! The engine is a pure state machine over the six-step cycle. It has no
//! internal thread and performs no I/O: the caller invokes `tick()` once per
//! elapsed second and reacts to the returned events.
//!
//! ## State Transitions
//!
//! ```text
//! Paused -> Running -> (tick to zero) -> SessionCompleted -> next position
//!                                          (Running if auto-start, else Paused)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(settings);
//! engine.start();
//! // once per second:
//! if let Some(Event::SessionCompleted { .. }) = engine.tick() { /* persist */ }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cycle::CyclePosition;
use super::kind::{resolve_duration, SessionKind};
use crate::events::Event;
use crate::settings::PomodoroSettings;

/// The part of the engine that survives a restart.
///
/// Countdown progress is deliberately not part of it: a restored engine
/// starts its current position from the full duration, paused.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineCheckpoint {
    #[serde(default)]
    pub position: CyclePosition,
    #[serde(default)]
    pub active_task_id: Option<String>,
}

/// Core timer engine.
#[derive(Debug, Clone)]
pub struct TimerEngine {
    settings: PomodoroSettings,
    position: CyclePosition,
    /// Length in minutes the current position was loaded with.
    duration_min: u32,
    remaining_secs: u64,
    running: bool,
    active_task_id: Option<String>,
    /// Number of completions emitted so far.
    completions: u64,
}

impl TimerEngine {
    /// Position 0 (focus), full focus duration, paused.
    pub fn new(settings: PomodoroSettings) -> Self {
        Self::restore(settings, EngineCheckpoint::default())
    }

    pub fn restore(settings: PomodoroSettings, checkpoint: EngineCheckpoint) -> Self {
        let mut engine = Self {
            settings,
            position: checkpoint.position,
            duration_min: 0,
            remaining_secs: 0,
            running: false,
            active_task_id: checkpoint.active_task_id,
            completions: 0,
        };
        engine.load_position();
        engine
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn checkpoint(&self) -> EngineCheckpoint {
        EngineCheckpoint {
            position: self.position,
            active_task_id: self.active_task_id.clone(),
        }
    }

    pub fn settings(&self) -> &PomodoroSettings {
        &self.settings
    }

    pub fn position(&self) -> CyclePosition {
        self.position
    }

    pub fn kind(&self) -> SessionKind {
        self.position.kind()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn active_task_id(&self) -> Option<&str> {
        self.active_task_id.as_deref()
    }

    pub fn completions(&self) -> u64 {
        self.completions
    }

    /// Minutes the current position runs for. A running countdown keeps the
    /// length it was loaded with even if the settings change underneath it.
    pub fn duration_min(&self) -> u32 {
        self.duration_min
    }

    /// Full length of the current position in seconds.
    pub fn total_secs(&self) -> u64 {
        minutes_to_secs(self.duration_min)
    }

    /// 0.0 .. 100.0 progress within the current position.
    pub fn progress_pct(&self) -> f64 {
        let total = self.total_secs();
        if total == 0 {
            return 0.0;
        }
        (1.0 - self.remaining_secs as f64 / total as f64) * 100.0
    }

    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            position: self.position,
            kind: self.kind(),
            running: self.running,
            remaining_secs: self.remaining_secs,
            total_secs: self.total_secs(),
            progress_pct: self.progress_pct(),
            active_task_id: self.active_task_id.clone(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Returns `None` when already running.
    pub fn start(&mut self) -> Option<Event> {
        if self.running {
            return None;
        }
        self.running = true;
        Some(Event::TimerStarted {
            position: self.position,
            kind: self.kind(),
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Returns `None` when already paused.
    pub fn pause(&mut self) -> Option<Event> {
        if !self.running {
            return None;
        }
        self.running = false;
        Some(Event::TimerPaused {
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    pub fn toggle(&mut self) -> Option<Event> {
        if self.running {
            self.pause()
        } else {
            self.start()
        }
    }

    /// Back to the full duration of the current kind. Never records a session.
    pub fn reset(&mut self) -> Event {
        self.running = false;
        self.load_position();
        Event::TimerReset {
            kind: self.kind(),
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        }
    }

    /// Move to the next position without recording a session.
    pub fn skip(&mut self) -> Event {
        let from = self.position;
        self.running = false;
        self.position = self.position.next();
        self.load_position();
        Event::TimerSkipped {
            from,
            to: self.position,
            at: Utc::now(),
        }
    }

    pub fn set_active_task(&mut self, task_id: Option<String>) -> Event {
        self.active_task_id = task_id;
        Event::ActiveTaskChanged {
            task_id: self.active_task_id.clone(),
            at: Utc::now(),
        }
    }

    /// Swap in new settings. A paused countdown is re-resolved right away;
    /// a running one keeps its remaining time until the next position.
    pub fn apply_settings(&mut self, settings: PomodoroSettings) {
        self.settings = settings;
        if !self.running {
            self.load_position();
        }
    }

    /// Call once per elapsed second.
    pub fn tick(&mut self) -> Option<Event> {
        self.tick_at(Utc::now())
    }

    /// Like [`tick`](Self::tick) with an explicit completion timestamp.
    pub fn tick_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if !self.running {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            return Some(self.complete(now));
        }
        None
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn load_position(&mut self) {
        self.duration_min = resolve_duration(self.kind(), &self.settings);
        self.remaining_secs = minutes_to_secs(self.duration_min);
    }

    fn complete(&mut self, now: DateTime<Utc>) -> Event {
        let position = self.position;
        let kind = position.kind();
        let duration_min = self.duration_min;
        let task_id = match kind {
            SessionKind::Focus => self.active_task_id.clone(),
            _ => None,
        };

        self.completions += 1;
        self.position = position.next();
        let next_kind = self.position.kind();
        self.load_position();
        self.running = if next_kind.is_break() {
            self.settings.auto_start_breaks
        } else {
            self.settings.auto_start_focus
        };

        Event::SessionCompleted {
            sequence: self.completions,
            position,
            kind,
            duration_min,
            task_id,
            next_position: self.position,
            next_kind,
            auto_started: self.running,
            at: now,
        }
    }
}

fn minutes_to_secs(minutes: u32) -> u64 {
    u64::from(minutes).saturating_mul(60)
}
