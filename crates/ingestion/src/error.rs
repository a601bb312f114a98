//! Ingestion error types

use std::path::PathBuf;

use thiserror::Error;

/// Ingestion error
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Session file could not be read or written
    #[error("session io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Session line is not a valid event
    #[error("failed to parse session line {line}: {message}")]
    ParseFailed { line: usize, message: String },

    /// Frame image could not be decoded or encoded
    #[error("failed to load frame image {path}: {message}")]
    ImageLoad { path: PathBuf, message: String },

    /// Receiver dropped before replay finished
    #[error("replay channel closed")]
    ChannelClosed,
}

impl IngestionError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Ingestion Result type alias
pub type Result<T> = std::result::Result<T, IngestionError>;
