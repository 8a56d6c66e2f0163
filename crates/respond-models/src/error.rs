//! Validation errors raised at the registry boundary.

use thiserror::Error;

/// Reasons an incident, resource or venue layout is rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Entity id is empty or whitespace.
    #[error("{entity} id must not be empty")]
    EmptyId { entity: &'static str },

    /// Location contains NaN or infinite coordinates.
    #[error("{entity} {id} has a non-finite location")]
    NonFiniteLocation { entity: &'static str, id: String },

    /// Incident priority outside 1..=5.
    #[error("incident {id} has priority {priority}, expected 1..=5")]
    PriorityOutOfRange { id: String, priority: u8 },

    /// Resource response time factor negative or non-finite.
    #[error("resource {id} has invalid response time factor {factor}")]
    InvalidResponseFactor { id: String, factor: f64 },

    /// Same id declared twice within one venue layout.
    #[error("duplicate {entity} id: {id}")]
    DuplicateId { entity: &'static str, id: String },

    /// Payload could not be parsed (missing field, unknown type, unknown field).
    #[error("malformed {entity}: {reason}")]
    Malformed { entity: &'static str, reason: String },
}

/// Result type alias for validation.
pub type Result<T> = std::result::Result<T, ValidationError>;
