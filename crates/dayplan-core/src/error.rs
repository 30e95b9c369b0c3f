//! Core error types for dayplan-core.
//!
//! Validation failures are the caller's precondition violations; the
//! generator and tracker never correct bad input silently. Database and
//! configuration errors belong to the storage collaborator.

use std::path::PathBuf;
use thiserror::Error;

use crate::time_of_day::TimeOfDay;

/// Core error type for dayplan-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A record the operation depends on has not been created yet
    #[error("No {kind} recorded for user '{user_id}' on {date}")]
    MissingRecord {
        kind: &'static str,
        user_id: String,
        date: chrono::NaiveDate,
    },

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// The stored cursor moved since it was read
    #[error("Plan {plan_id} is no longer at step {expected}; reload and retry")]
    StaleStep { plan_id: String, expected: usize },

    /// The row targeted by an update does not exist
    #[error("No {table} row with id {id}")]
    NotFound { table: &'static str, id: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Could not locate the data directory
    #[error("Cannot resolve data directory: {0}")]
    DataDir(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Malformed `HH:MM` string
    #[error("Invalid time of day '{input}': {message}")]
    InvalidTimeOfDay { input: String, message: String },

    /// Integer score outside its allowed range
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// Invalid time range
    #[error("Invalid time range for '{title}': end ({end}) must be after start ({start})")]
    InvalidTimeRange {
        title: String,
        start: TimeOfDay,
        end: TimeOfDay,
    },

    /// Two calendar events share wall-clock time
    #[error("Calendar events overlap: '{first}' ends at {first_end} but '{second}' starts at {second_start}")]
    OverlappingEvents {
        first: String,
        first_end: TimeOfDay,
        second: String,
        second_start: TimeOfDay,
    },

    /// Events were supplied for an empty work window
    #[error("Work window {start}-{end} is empty but {events} calendar event(s) were supplied")]
    EmptyWorkWindow {
        start: TimeOfDay,
        end: TimeOfDay,
        events: usize,
    },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked
                    || e.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
