//! Wiring shared by the commands: config, database and controller bootstrap.

use coniunctis_core::storage::Database;
use coniunctis_core::{
    Config, CoreError, CycleController, EngineCheckpoint, Notifier, Outbox, PomodoroSettings,
    SessionGateway,
};

const CHECKPOINT_KEY: &str = "timer_checkpoint";

pub struct App {
    pub config: Config,
    pub db: Database,
}

impl App {
    pub fn open(config: Config) -> Result<Self, CoreError> {
        let path = config.database_path()?;
        let db = Database::open_at(&path)?;
        tracing::debug!(path = %path.display(), "database opened");
        Ok(Self { config, db })
    }

    pub fn user_id(&self) -> &str {
        &self.config.user_id
    }

    /// Stored settings for the user, or the config defaults.
    pub fn settings(&self) -> Result<PomodoroSettings, CoreError> {
        Ok(self
            .db
            .load_settings(self.user_id())?
            .unwrap_or_else(|| self.config.defaults.clone()))
    }

    fn checkpoint_key(&self) -> String {
        format!("{CHECKPOINT_KEY}:{}", self.user_id())
    }

    pub fn load_checkpoint(&self) -> EngineCheckpoint {
        match self.db.kv_get(&self.checkpoint_key()) {
            Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!("discarding unreadable timer checkpoint: {e}");
                EngineCheckpoint::default()
            }),
            Ok(None) => EngineCheckpoint::default(),
            Err(e) => {
                tracing::warn!("could not read timer checkpoint: {e}");
                EngineCheckpoint::default()
            }
        }
    }

    pub fn save_checkpoint(&self, checkpoint: &EngineCheckpoint) -> Result<(), CoreError> {
        let json = serde_json::to_string(checkpoint)?;
        self.db.kv_set(&self.checkpoint_key(), &json)?;
        Ok(())
    }

    pub fn controller<N: Notifier>(
        &self,
        notifier: N,
    ) -> Result<CycleController<&Database, N>, CoreError> {
        let outbox = Outbox::open(self.config.outbox_path()?)?;
        Ok(CycleController::bootstrap(
            &self.db,
            notifier,
            outbox,
            self.user_id(),
            self.load_checkpoint(),
            self.config.defaults.clone(),
        ))
    }
}
