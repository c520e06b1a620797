//! Per-user Pomodoro settings.
//!
//! At most one row per user lives in the store. When no row exists the
//! defaults below (or the `[defaults]` table from `config.toml`) are used.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PomodoroSettings {
    /// Focus length in minutes.
    #[serde(default = "default_focus_duration")]
    pub focus_duration: u32,
    #[serde(default = "default_short_break")]
    pub short_break_duration: u32,
    #[serde(default = "default_long_break")]
    pub long_break_duration: u32,
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
    #[serde(default)]
    pub auto_start_breaks: bool,
    #[serde(default)]
    pub auto_start_focus: bool,
}

fn default_focus_duration() -> u32 {
    25
}
fn default_short_break() -> u32 {
    5
}
fn default_long_break() -> u32 {
    15
}
fn default_true() -> bool {
    true
}

impl Default for PomodoroSettings {
    fn default() -> Self {
        Self {
            focus_duration: default_focus_duration(),
            short_break_duration: default_short_break(),
            long_break_duration: default_long_break(),
            sound_enabled: true,
            auto_start_breaks: false,
            auto_start_focus: false,
        }
    }
}

impl PomodoroSettings {
    /// Reject zero-length durations. Called before settings are saved.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let fields = [
            ("focus_duration", self.focus_duration),
            ("short_break_duration", self.short_break_duration),
            ("long_break_duration", self.long_break_duration),
        ];
        for (field, minutes) in fields {
            if minutes == 0 {
                return Err(ValidationError::invalid(field, "must be at least 1 minute"));
            }
        }
        Ok(())
    }

    /// Update one field from its textual form, e.g. `("focus_duration", "50")`.
    pub fn set_field(&mut self, key: &str, value: &str) -> Result<(), ValidationError> {
        let minutes = |v: &str| {
            v.parse::<u32>()
                .map_err(|_| ValidationError::invalid(key, format!("'{v}' is not a number of minutes")))
        };
        let flag = |v: &str| {
            v.parse::<bool>()
                .map_err(|_| ValidationError::invalid(key, format!("'{v}' is not true/false")))
        };
        let mut next = self.clone();
        match key {
            "focus_duration" => next.focus_duration = minutes(value)?,
            "short_break_duration" => next.short_break_duration = minutes(value)?,
            "long_break_duration" => next.long_break_duration = minutes(value)?,
            "sound_enabled" => next.sound_enabled = flag(value)?,
            "auto_start_breaks" => next.auto_start_breaks = flag(value)?,
            "auto_start_focus" => next.auto_start_focus = flag(value)?,
            other => return Err(ValidationError::invalid(other, "unknown settings field")),
        }
        next.validate()?;
        *self = next;
        Ok(())
    }
}
