use clap::Subcommand;
use coniunctis_core::{Config, PomodoroSettings, SessionGateway};

use crate::app::App;

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print the current settings as JSON
    Show,
    /// Change one field, e.g. `focus_duration 50`
    Set {
        /// focus_duration, short_break_duration, long_break_duration,
        /// sound_enabled, auto_start_breaks or auto_start_focus
        key: String,
        /// New value
        value: String,
    },
    /// Store the config defaults as this user's settings
    Reset,
}

pub fn run(action: SettingsAction, config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let app = App::open(config)?;

    match action {
        SettingsAction::Show => {
            let settings = app.settings()?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        SettingsAction::Set { key, value } => {
            let mut settings = app.settings()?;
            settings.set_field(&key, &value)?;
            app.db.save_settings(app.user_id(), &settings)?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        SettingsAction::Reset => {
            let settings: PomodoroSettings = app.config.defaults.clone();
            settings.validate()?;
            app.db.save_settings(app.user_id(), &settings)?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
    }
    Ok(())
}
