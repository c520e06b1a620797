use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{CyclePosition, SessionKind};

/// Every state change of the timer produces an Event.
/// The shell renders them; the cycle controller reacts to completions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        position: CyclePosition,
        kind: SessionKind,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        kind: SessionKind,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerSkipped {
        from: CyclePosition,
        to: CyclePosition,
        at: DateTime<Utc>,
    },
    /// A countdown reached zero while running. Emitted once per zero-crossing;
    /// `sequence` increases by one with every completion of the same engine.
    SessionCompleted {
        sequence: u64,
        position: CyclePosition,
        kind: SessionKind,
        duration_min: u32,
        task_id: Option<String>,
        next_position: CyclePosition,
        next_kind: SessionKind,
        auto_started: bool,
        at: DateTime<Utc>,
    },
    ActiveTaskChanged {
        task_id: Option<String>,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        position: CyclePosition,
        kind: SessionKind,
        running: bool,
        remaining_secs: u64,
        total_secs: u64,
        progress_pct: f64,
        active_task_id: Option<String>,
        at: DateTime<Utc>,
    },
}
