//! Core error types for movebreak-core.
//!
//! Errors are split by concern. Exercise client failures never travel past
//! the rotator (they become notices), so [`CoreError`] mostly shows up at the
//! edges: configuration loading and the one-shot CLI commands.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for movebreak-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Exercise backend errors
    #[error("Exercise backend error: {0}")]
    Client(#[from] ClientError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures reported by an exercise backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Transport failure, timeout, or a non-2xx status on fetch.
    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered a block request with anything but 201.
    #[error("Block rejected with status {status}")]
    Authorization { status: u16 },

    /// The response body was not the expected shape.
    #[error("Malformed response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
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

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Alarm playback failure. Always non-fatal.
#[derive(Error, Debug)]
pub enum AlarmError {
    #[error("Alarm output unavailable: {0}")]
    Unavailable(String),

    #[error("Alarm playback failed: {0}")]
    Playback(#[from] std::io::Error),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_error_mentions_status() {
        let err = ClientError::Authorization { status: 401 };
        assert_eq!(err.to_string(), "Block rejected with status 401");
    }

    #[test]
    fn client_error_converts_into_core_error() {
        let err: CoreError = ClientError::Network("connection refused".into()).into();
        assert!(matches!(err, CoreError::Client(ClientError::Network(_))));
        assert!(err.to_string().contains("connection refused"));
    }
}
