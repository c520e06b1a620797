use clap::Subcommand;
use coniunctis_core::Config;
use serde_json::json;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one value, e.g. `user_id` or `defaults.focus_duration`
    Get { key: String },
    /// Change one value and write the file; prints the stored value
    Set { key: String, value: String },
    /// Print the whole config as JSON
    List,
    /// Where the config file, database and outbox live
    Paths,
    /// Overwrite the config file with defaults
    Reset,
}

pub fn run(action: ConfigAction, config: Config) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let value = config.get(&key).ok_or_else(|| format!("unknown key: {key}"))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = config;
            config.set(&key, &value)?;
            config.save()?;
            if let Some(stored) = config.get(&key) {
                println!("{stored}");
            }
        }
        ConfigAction::List => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::Paths => {
            let paths = json!({
                "config": Config::path()?,
                "database": config.database_path()?,
                "outbox": config.outbox_path()?,
            });
            println!("{}", serde_json::to_string_pretty(&paths)?);
        }
        ConfigAction::Reset => {
            Config::default().save()?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
