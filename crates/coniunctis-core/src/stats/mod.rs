//! Statistics module for Coniunctis
//!
//! Derived analytics over completed sessions and tasks: consecutive-day
//! streaks, estimate efficiency, the productivity score and daily/category
//! rollups. Everything here is a pure function of the rows passed in, except
//! [`build_report`], which reads them through a gateway first.

mod efficiency;
mod report;
mod rollup;
mod score;
pub mod streak;

pub use efficiency::{average_efficiency, task_efficiency, EFFICIENCY_CAP};
pub use report::{build_report, derive_stats, DerivedStats};
pub use rollup::{
    category_rollup, daily_rollup, CategoryBucket, DailyBucket, TimeRange, CATEGORY_PALETTE,
    UNCATEGORIZED,
};
pub use score::{
    completion_rate, productivity_score, ProductivityLevel, ProductivityScore, ScoreInputs,
    NEUTRAL_EFFICIENCY,
};
pub use streak::{Streaks, CURRENT_STREAK_LOOKBACK_DAYS};
