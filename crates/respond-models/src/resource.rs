//! Response resource types (personnel and vehicles).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::{Result, ValidationError};
use crate::geo::Location;
use crate::ids::{IncidentId, ResourceId};
use crate::incident::IncidentKind;

/// Kind of deployable asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    MedicalPersonnel,
    Ambulance,
    FirePersonnel,
    FireTruck,
    SecurityPersonnel,
    PoliceCar,
}

impl ResourceKind {
    /// Returns true if this kind appears in the compatibility table for `incident`.
    pub fn can_serve(&self, incident: IncidentKind) -> bool {
        incident.compatible_resources().contains(self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::MedicalPersonnel => "medical_personnel",
            ResourceKind::Ambulance => "ambulance",
            ResourceKind::FirePersonnel => "fire_personnel",
            ResourceKind::FireTruck => "fire_truck",
            ResourceKind::SecurityPersonnel => "security_personnel",
            ResourceKind::PoliceCar => "police_car",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_capacity() -> u32 {
    1
}

fn default_available() -> bool {
    true
}

fn default_response_time_factor() -> f64 {
    1.0
}

/// A deployable asset capable of responding to incidents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Resource {
    /// Unique identifier for the resource.
    pub id: ResourceId,

    #[serde(rename = "type")]
    pub kind: ResourceKind,

    /// Current position.
    pub location: Location,

    #[serde(default = "default_capacity")]
    pub capacity: u32,

    /// Whether the resource can take a new assignment.
    #[serde(default = "default_available")]
    pub available: bool,

    #[serde(default)]
    pub capabilities: BTreeSet<String>,

    /// Multiplier on travel time (slower vehicles > 1.0).
    #[serde(default = "default_response_time_factor")]
    pub response_time_factor: f64,

    /// Incident this resource is committed to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_assignment: Option<IncidentId>,
}

impl Resource {
    /// Creates an available resource with a generated id.
    pub fn new(kind: ResourceKind, location: impl Into<Location>) -> Self {
        Self {
            id: ResourceId::new(),
            kind,
            location: location.into(),
            capacity: default_capacity(),
            available: true,
            capabilities: BTreeSet::new(),
            response_time_factor: default_response_time_factor(),
            current_assignment: None,
        }
    }

    /// Sets the resource id.
    pub fn with_id(mut self, id: impl Into<ResourceId>) -> Self {
        self.id = id.into();
        self
    }

    /// Adds a capability.
    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.insert(capability.into());
        self
    }

    /// Sets the response time factor.
    pub fn with_response_time_factor(mut self, factor: f64) -> Self {
        self.response_time_factor = factor;
        self
    }

    /// Sets the capacity.
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    /// Commits the resource to an incident.
    pub fn assign(&mut self, incident_id: IncidentId) {
        self.available = false;
        self.current_assignment = Some(incident_id);
    }

    /// Returns the resource to the available pool.
    pub fn release(&mut self) {
        self.available = true;
        self.current_assignment = None;
    }

    /// Checks the fields serde cannot: id, coordinates and response factor.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_blank() {
            return Err(ValidationError::EmptyId { entity: "resource" });
        }
        if !self.location.is_finite() {
            return Err(ValidationError::NonFiniteLocation {
                entity: "resource",
                id: self.id.to_string(),
            });
        }
        if !self.response_time_factor.is_finite() || self.response_time_factor < 0.0 {
            return Err(ValidationError::InvalidResponseFactor {
                id: self.id.to_string(),
                factor: self.response_time_factor,
            });
        }
        Ok(())
    }
}
