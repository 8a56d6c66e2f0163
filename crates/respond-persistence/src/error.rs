//! Error types for file IO.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or writing engine files.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("failed to read {}: {source}", .path.display())]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create directory {}: {source}", .path.display())]
    DirectoryError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization failed: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("{kind} file not found: {}", .path.display())]
    NotFound { kind: &'static str, path: PathBuf },

    /// File parsed but its content is unusable.
    #[error("invalid data in {}: {reason}", .path.display())]
    InvalidData { path: PathBuf, reason: String },
}

/// Result type alias for file IO.
pub type Result<T> = std::result::Result<T, PersistenceError>;
