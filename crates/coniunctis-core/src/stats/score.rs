//! Productivity score: one bounded number from completion rate, volume and
//! estimate efficiency.
//!
//! ```text
//! score = round(clamp(rate * 100 * 0.4 + min(pomodoros / 7, 10) * 4 + efficiency * 20, 0, 100))
//! ```

use serde::{Deserialize, Serialize};

use super::efficiency::average_efficiency;
use crate::model::Task;

/// Efficiency assumed when no task carries an estimate.
pub const NEUTRAL_EFFICIENCY: f64 = 1.0;

/// Serialized with the same labels [`label`](Self::label) returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductivityLevel {
    Excellent,
    Good,
    Fair,
    #[serde(rename = "Needs Improvement")]
    NeedsImprovement,
}

impl ProductivityLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => ProductivityLevel::Excellent,
            60..=79 => ProductivityLevel::Good,
            40..=59 => ProductivityLevel::Fair,
            _ => ProductivityLevel::NeedsImprovement,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProductivityLevel::Excellent => "Excellent",
            ProductivityLevel::Good => "Good",
            ProductivityLevel::Fair => "Fair",
            ProductivityLevel::NeedsImprovement => "Needs Improvement",
        }
    }
}

impl std::fmt::Display for ProductivityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreInputs {
    /// Completed / total tasks in the window, 0.0 ..= 1.0.
    pub completion_rate: f64,
    /// Focus sessions completed in the window.
    pub total_pomodoros: u32,
    /// Mean capped efficiency over all tasks with an estimate.
    pub average_efficiency: f64,
}

impl ScoreInputs {
    pub fn from_tasks(completion_rate: f64, total_pomodoros: u32, all_tasks: &[Task]) -> Self {
        Self {
            completion_rate,
            total_pomodoros,
            average_efficiency: average_efficiency(all_tasks).unwrap_or(NEUTRAL_EFFICIENCY),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductivityScore {
    pub score: u8,
    pub level: ProductivityLevel,
}

/// Fraction of tasks completed; 0 when there are none.
pub fn completion_rate(completed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (completed as f64 / total as f64).clamp(0.0, 1.0)
}

pub fn productivity_score(inputs: &ScoreInputs) -> ProductivityScore {
    let rate = finite_or_zero(inputs.completion_rate).clamp(0.0, 1.0);
    let efficiency = finite_or_zero(inputs.average_efficiency).max(0.0);
    let volume = (f64::from(inputs.total_pomodoros) / 7.0).min(10.0);

    let raw = rate * 100.0 * 0.4 + volume * 4.0 + efficiency * 20.0;
    let score = raw.clamp(0.0, 100.0).round() as u8;
    ProductivityScore {
        score,
        level: ProductivityLevel::from_score(score),
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}
