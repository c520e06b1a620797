mod controller;
mod cycle;
mod driver;
mod engine;
mod kind;

pub use controller::CycleController;
pub use cycle::CyclePosition;
pub use driver::{Tick, TickDriver, TICK_PERIOD};
pub use engine::{EngineCheckpoint, TimerEngine};
pub use kind::{resolve_duration, resolve_duration_label, SessionKind};
