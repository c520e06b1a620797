//! # Coniunctis Core Library
//!
//! Core logic for the Coniunctis focus timer: the six-step Pomodoro cycle,
//! session and task persistence behind a gateway, and analytics derived from
//! the stored history. Shells (the `coniunctis` CLI, tests) drive it; nothing
//! in here owns a thread or a global.
//!
//! ## Architecture
//!
//! - **Timer**: a pure tick-driven state machine ([`TimerEngine`]), a
//!   [`CycleController`] that persists completions exactly once, and a tokio
//!   [`TickDriver`] that supplies one tick per second
//! - **Storage**: the [`SessionGateway`] / [`TaskStore`] contracts, backed by
//!   SQLite ([`Database`]) or memory ([`InMemoryGateway`]), a retry
//!   [`Outbox`] and TOML [`Config`]
//! - **Stats**: streaks, efficiency, productivity score and rollups
//! - **Notifier**: injected side channel for sounds and user notices

pub mod error;
pub mod events;
pub mod model;
pub mod notifier;
pub mod settings;
pub mod stats;
pub mod storage;
pub mod tasks;
pub mod timer;

pub use error::{ConfigError, CoreError, DatabaseError, GatewayError, ValidationError};
pub use events::Event;
pub use model::{NewSession, NewTask, Priority, Session, Task, TaskFilter};
pub use notifier::{Notice, Notifier, QueuedNotifier, TracingNotifier};
pub use settings::PomodoroSettings;
pub use stats::{build_report, DerivedStats, TimeRange};
pub use storage::{
    Config, Database, FlushReport, InMemoryGateway, Outbox, PendingWrite, SessionGateway,
    TaskStore,
};
pub use timer::{
    CycleController, CyclePosition, EngineCheckpoint, SessionKind, Tick, TickDriver,
    TimerEngine,
};
