//! Core error types for resttimer-core.
//!
//! Timer operations themselves never fail. These errors describe the
//! collaborators around the timer (preference store, historical source,
//! sinks, configuration) and are mostly logged and swallowed by the
//! adapters that encounter them.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for resttimer-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Preference store or historical source errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Haptic or analytics delivery errors
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// No tokio runtime is available to drive tick subscriptions
    #[error("No async runtime available: {0}")]
    Runtime(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
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

    /// Key does not exist in the configuration
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Could not determine or create the data directory
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Errors raised by external stores (preferences, history).
#[derive(Error, Debug)]
pub enum StoreError {
    /// No record exists for the requested user
    #[error("No record found for user '{0}'")]
    NotFound(String),

    /// Store could not be reached or read
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Stored document could not be decoded
    #[error("Malformed record: {0}")]
    Malformed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while delivering side effects.
#[derive(Error, Debug)]
pub enum SinkError {
    /// Receiving end is gone
    #[error("Sink '{0}' is closed")]
    Closed(String),

    /// Delivery failed for another reason
    #[error("Delivery to '{sink}' failed: {message}")]
    DeliveryFailed { sink: String, message: String },
}

/// Validation errors.
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    /// Value outside its allowed range
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Malformed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
