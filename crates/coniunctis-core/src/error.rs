//! Core error types for coniunctis-core.
//!
//! Gateway implementations report [`GatewayError`]; everything else funnels
//! into [`CoreError`] through `#[from]` conversions.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for coniunctis-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Persistence gateway errors
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    #[error("Database is locked")]
    Locked,
}

/// Errors returned by a [`SessionGateway`](crate::storage::SessionGateway)
/// or [`TaskStore`](crate::storage::TaskStore) implementation.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The backing store could not be reached. Treated as transient.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl GatewayError {
    /// Whether a retry of the same write may succeed later.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GatewayError::Unavailable(_) | GatewayError::Database(DatabaseError::Locked)
        )
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    #[error("unknown config key: {0}")]
    UnknownKey(String),

    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("Could not determine data directory: {0}")]
    DataDir(String),
}

/// Validation errors for input coming from the outer shell.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl ValidationError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _msg)
                if code.code == rusqlite::ErrorCode::DatabaseLocked
                    || code.code == rusqlite::ErrorCode::DatabaseBusy =>
            {
                DatabaseError::Locked
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for GatewayError {
    fn from(err: rusqlite::Error) -> Self {
        GatewayError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_is_transient() {
        assert!(GatewayError::Unavailable("offline".into()).is_transient());
        assert!(GatewayError::Database(DatabaseError::Locked).is_transient());
    }

    #[test]
    fn not_found_is_permanent() {
        let err = GatewayError::NotFound {
            entity: "task",
            id: "t-1".into(),
        };
        assert!(!err.is_transient());
        assert_eq!(err.to_string(), "task 't-1' not found");
    }

    #[test]
    fn gateway_error_converts_into_core_error() {
        let core: CoreError = GatewayError::Unavailable("down".into()).into();
        assert!(matches!(core, CoreError::Gateway(_)));
    }
}
