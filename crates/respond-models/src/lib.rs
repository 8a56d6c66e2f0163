//! Core data models for the emergency response engine.
//!
//! This crate provides the types shared by every other crate: incidents,
//! resources, venue layouts, typed ids, and the plans the engine produces.

pub mod assignment;
pub mod communication;
pub mod error;
pub mod evacuation;
pub mod geo;
pub mod ids;
pub mod incident;
pub mod resource;
pub mod venue;

// Re-export main types
pub use assignment::{Assignment, AssignmentDetail, AssignmentMap};
pub use communication::{
    Audience, Channel, ChannelPolicy, CommunicationPlan, Contact, ContactKind, TimelineEntry,
};
pub use error::ValidationError;
pub use evacuation::{Direction, EvacuationPlan, EvacuationRoute, ExitLoad};
pub use geo::Location;
pub use ids::{ExitId, IncidentId, ResourceId, ZoneId};
pub use incident::{Incident, IncidentKind, IncidentStatus, Severity};
pub use resource::{Resource, ResourceKind};
pub use venue::{CrowdDistribution, Exit, VenueLayout, Zone};
