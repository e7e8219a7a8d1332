//! Error types for qmd-remote

use crate::config::Capability;
use thiserror::Error;

/// Result type alias using QmdError
pub type Result<T> = std::result::Result<T, QmdError>;

/// Error type alias for convenience
pub type Error = QmdError;

/// Exit codes for CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const UNAVAILABLE: i32 = 2;
    pub const INVALID_INPUT: i32 = 3;
}

/// Main error type for qmd-remote
///
/// These errors never escape the degrade-safe client surface; they are produced by
/// the internal request helpers and by the config store's write path.
#[derive(Debug, Error)]
pub enum QmdError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("No {0} endpoint configured")]
    NotConfigured(Capability),

    #[error("External service error: {0}")]
    ExternalError(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl QmdError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotConfigured(_) | Self::ExternalError(_) | Self::Http(_) => {
                exit_codes::UNAVAILABLE
            }
            Self::Config(_) => exit_codes::INVALID_INPUT,
            _ => exit_codes::GENERAL_ERROR,
        }
    }
}
