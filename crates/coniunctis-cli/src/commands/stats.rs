use chrono::{Local, Utc};
use clap::Subcommand;
use coniunctis_core::{build_report, Config, TimeRange};

use crate::app::App;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Full analytics report as JSON
    Report {
        /// week, month or year; defaults to the configured range
        #[arg(long, short = 'r')]
        range: Option<TimeRange>,
    },
    /// Current and longest streak
    Streak,
}

pub fn run(action: StatsAction, config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let app = App::open(config)?;

    match action {
        StatsAction::Report { range } => {
            let range = range.unwrap_or(app.config.default_range);
            let report = build_report(&app.db, app.user_id(), range, Utc::now(), &Local)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        StatsAction::Streak => {
            let report = build_report(&app.db, app.user_id(), TimeRange::Week, Utc::now(), &Local)?;
            println!("{}", serde_json::to_string_pretty(&report.streaks)?);
        }
    }
    Ok(())
}
