//! Core error types for focusflow-core.
//!
//! Nothing in the core is fatal to the host: every failure below is a value
//! returned to (or reported back to) the caller.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for focusflow-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration values out of bounds or of the wrong shape.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// An operation was invoked in a state that disallows it.
    #[error("Cannot {operation} while the timer is {state}")]
    IllegalStateTransition {
        operation: &'static str,
        state: &'static str,
    },

    /// The session store reported a failure for append/clear.
    #[error("Session persistence failed: {0}")]
    SessionPersistence(#[from] StoreError),

    /// The timer driver task is gone.
    #[error("Timer driver has stopped")]
    DriverStopped,

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A numeric setting outside its allowed range.
    #[error("'{key}' must be between {min} and {max}, got {value}")]
    OutOfRange {
        key: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// Unknown dot-path key.
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Value cannot be converted to the key's type.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Errors reported by a session or task store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Store-side validation refused the record.
    #[error("Store rejected record: {0}")]
    Rejected(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    Database(String),

    /// The store (or the task writing to it) went away before answering.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// No record with the given id.
    #[error("Not found: {0}")]
    NotFound(String),
}

/// A malformed session in an aggregation snapshot.
///
/// Such records are excluded from statistics instead of failing the whole
/// computation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregationInputError {
    #[error("session '{id}' has non-positive duration {duration_seconds}")]
    InvalidDuration { id: String, duration_seconds: i64 },

    #[error("session has an empty id")]
    EmptyId,

    #[error("session '{id}' has unknown mode '{raw}'")]
    UnknownMode { id: String, raw: String },

    #[error("session '{id}' has unparseable endedAt '{raw}'")]
    UnparseableEndedAt { id: String, raw: String },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
