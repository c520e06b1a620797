//! The fixed six-step Pomodoro cycle.
//!
//! ```text
//! Focus1 -> ShortBreak1 -> Focus2 -> ShortBreak2 -> Focus3 -> LongBreak -> Focus1 ...
//! ```
//!
//! Positions are an enum rather than an index so an out-of-range position
//! cannot be constructed.

use serde::{Deserialize, Serialize};

use super::kind::SessionKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePosition {
    #[default]
    Focus1,
    ShortBreak1,
    Focus2,
    ShortBreak2,
    Focus3,
    LongBreak,
}

impl CyclePosition {
    pub const LEN: usize = 6;

    pub const ALL: [CyclePosition; Self::LEN] = [
        CyclePosition::Focus1,
        CyclePosition::ShortBreak1,
        CyclePosition::Focus2,
        CyclePosition::ShortBreak2,
        CyclePosition::Focus3,
        CyclePosition::LongBreak,
    ];

    pub fn kind(&self) -> SessionKind {
        match self {
            CyclePosition::Focus1 | CyclePosition::Focus2 | CyclePosition::Focus3 => {
                SessionKind::Focus
            }
            CyclePosition::ShortBreak1 | CyclePosition::ShortBreak2 => SessionKind::ShortBreak,
            CyclePosition::LongBreak => SessionKind::LongBreak,
        }
    }

    /// Zero-based index into the cycle.
    pub fn index(&self) -> usize {
        match self {
            CyclePosition::Focus1 => 0,
            CyclePosition::ShortBreak1 => 1,
            CyclePosition::Focus2 => 2,
            CyclePosition::ShortBreak2 => 3,
            CyclePosition::Focus3 => 4,
            CyclePosition::LongBreak => 5,
        }
    }

    /// Position for an arbitrary index, wrapping modulo the cycle length.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::LEN]
    }

    pub fn next(&self) -> Self {
        Self::from_index(self.index() + 1)
    }
}
