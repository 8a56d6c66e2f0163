//! Error types for registry operations.

use respond_models::{IncidentKind, IncidentStatus, ValidationError};
use thiserror::Error;

/// Errors that can occur during registry operations.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Incident not found.
    #[error("incident not found: {0}")]
    IncidentNotFound(String),

    /// Resource not found.
    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    /// Status change not allowed by the incident state machine.
    #[error("invalid transition for incident {id}: {from} -> {to}")]
    InvalidTransition {
        id: String,
        from: IncidentStatus,
        to: IncidentStatus,
    },

    /// Re-registration would change the type of an incident that still
    /// holds committed resources.
    #[error("incident {id} has {committed} committed resource(s), cannot change type {from} -> {to}")]
    KindConflict {
        id: String,
        from: IncidentKind,
        to: IncidentKind,
        committed: usize,
    },

    /// Entity rejected at the registry boundary.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Lock poisoned (thread panicked while holding lock).
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, DispatchError>;
