use serde::{Deserialize, Serialize};

use crate::settings::PomodoroSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    Focus,
    ShortBreak,
    LongBreak,
}

impl SessionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::Focus => "focus",
            SessionKind::ShortBreak => "short_break",
            SessionKind::LongBreak => "long_break",
        }
    }

    /// Parse a stored kind. Anything unrecognised is treated as focus.
    pub fn from_label(label: &str) -> Self {
        match label {
            "short_break" => SessionKind::ShortBreak,
            "long_break" => SessionKind::LongBreak,
            _ => SessionKind::Focus,
        }
    }

    pub fn is_break(&self) -> bool {
        !matches!(self, SessionKind::Focus)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SessionKind::Focus => "Focus",
            SessionKind::ShortBreak => "Short Break",
            SessionKind::LongBreak => "Long Break",
        }
    }
}

impl std::fmt::Display for SessionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Duration in minutes configured for `kind`.
pub fn resolve_duration(kind: SessionKind, settings: &PomodoroSettings) -> u32 {
    match kind {
        SessionKind::Focus => settings.focus_duration,
        SessionKind::ShortBreak => settings.short_break_duration,
        SessionKind::LongBreak => settings.long_break_duration,
    }
}

/// Same as [`resolve_duration`] for a kind given by its stored label.
pub fn resolve_duration_label(label: &str, settings: &PomodoroSettings) -> u32 {
    resolve_duration(SessionKind::from_label(label), settings)
}
