//! Error types for CLI operations.

use std::path::Path;

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Session directory or its event file not found
    #[error("Session not found: {path}")]
    SessionNotFound { path: String },

    /// Session contains no frames to analyse
    #[error("Session has no frames: {path}")]
    EmptySession { path: String },
}

impl CliError {
    pub fn config_not_found(path: &Path) -> Self {
        Self::ConfigNotFound {
            path: path.display().to_string(),
        }
    }

    pub fn session_not_found(path: &Path) -> Self {
        Self::SessionNotFound {
            path: path.display().to_string(),
        }
    }

    pub fn empty_session(path: &Path) -> Self {
        Self::EmptySession {
            path: path.display().to_string(),
        }
    }
}

/// Fail with [`CliError::ConfigNotFound`] unless `path` exists
pub fn ensure_config_exists(path: &Path) -> Result<(), CliError> {
    if path.exists() {
        Ok(())
    } else {
        Err(CliError::config_not_found(path))
    }
}
