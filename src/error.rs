//! Error types for the compatibility gate

use thiserror::Error;

/// Result type for gate operations
pub type Result<T> = std::result::Result<T, CompatError>;

/// Fatal gate errors.
///
/// Rule violations found while classifying a diff are not errors in this
/// sense; they are collected into a [`crate::report::Report`].
#[derive(Error, Debug)]
pub enum CompatError {
    #[error("Malformed schema: {0}")]
    MalformedSchema(String),

    #[error("Registry unavailable for subject '{subject}': {reason}")]
    RegistryUnavailable { subject: String, reason: String },

    #[error("Invalid compatibility mode: {0}")]
    InvalidMode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),
}

impl CompatError {
    /// Shorthand for a [`CompatError::MalformedSchema`]
    pub fn malformed(reason: impl Into<String>) -> Self {
        CompatError::MalformedSchema(reason.into())
    }
}
