//! Error handling module for winsetup
//!
//! Provides the crate-level error type using thiserror. Catalog parsing has
//! its own `CatalogError` (see `catalog`), which converts into this type.
//! Per-entry failures never surface here: the batch executor turns them into
//! `Outcome::Failed`.

use thiserror::Error;

use crate::catalog::CatalogError;

/// Main error type for winsetup
#[derive(Error, Debug)]
pub enum SetupError {
    /// IO errors (file operations, console)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors (loading, parsing, validation)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog loading errors
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// External command errors (spawn failures, unexpected output)
    #[error("Command failed: {0}")]
    Command(String),

    /// Validation errors (user input, identifiers)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Pre-flight environment check failures
    #[error("Pre-flight check failed: {0}")]
    Preflight(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for winsetup operations
pub type Result<T> = std::result::Result<T, SetupError>;

// Convenient error constructors
impl SetupError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a command error
    pub fn command(msg: impl Into<String>) -> Self {
        Self::Command(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a pre-flight error
    pub fn preflight(msg: impl Into<String>) -> Self {
        Self::Preflight(msg.into())
    }
}
