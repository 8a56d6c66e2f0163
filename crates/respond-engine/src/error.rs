//! Error types for engine operations.

use respond_dispatch::DispatchError;
use respond_persistence::PersistenceError;
use thiserror::Error;

/// Errors that can occur in the engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Registry operation failed.
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// File IO failed.
    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Configuration could not be loaded or an override was malformed.
    #[error("config error: {0}")]
    Config(String),
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
