mod config;
pub mod database;
pub mod gateway;
pub mod memory;
pub mod migrations;
pub mod outbox;

pub use config::Config;
pub use database::Database;
pub use gateway::{SessionGateway, TaskStore};
pub use memory::InMemoryGateway;
pub use outbox::{FlushReport, Outbox, PendingWrite};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory, creating it if needed.
///
/// `CONIUNCTIS_DATA_DIR` overrides the location outright. Otherwise this is
/// `~/.config/coniunctis/`, or `~/.config/coniunctis-dev/` when
/// `CONIUNCTIS_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("CONIUNCTIS_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("CONIUNCTIS_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("coniunctis-dev")
            } else {
                base_dir.join("coniunctis")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
