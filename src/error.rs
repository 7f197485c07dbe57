//! Unified error types for the Netzone API.

use thiserror::Error;

/// Startup errors for the service binary.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration values were loaded but are unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Failures while loading a JSON document from the data directory.
///
/// The `Display` text is returned verbatim to clients in the `message`
/// field of the data endpoints' error body.
#[derive(Error, Debug)]
pub enum DataError {
    /// The file exists but could not be read.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid JSON.
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    /// The document is not a JSON object, so no field can be looked up.
    #[error("document is not a JSON object (found {found})")]
    NotAnObject {
        /// JSON type that was found instead.
        found: &'static str,
    },

    /// The count field holds a value that has no length.
    #[error("field '{field}' has no length (found {found})")]
    NoLength {
        /// Name of the count field.
        field: &'static str,
        /// JSON type that was found.
        found: &'static str,
    },
}

/// Credential gate rejections.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// At least one of the two keys was not supplied.
    #[error("Missing API keys")]
    MissingKeys,

    /// Both keys were supplied but at least one does not match.
    #[error("Invalid API keys")]
    InvalidKeys,
}

impl AuthError {
    /// Human-readable explanation sent alongside the error label.
    pub fn message(&self) -> &'static str {
        match self {
            AuthError::MissingKeys => "Both public_key and secret_key are required",
            AuthError::InvalidKeys => "The provided API keys are invalid",
        }
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, ApiError>;
