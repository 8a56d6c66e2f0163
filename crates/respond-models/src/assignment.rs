//! Assignment results produced by the optimizer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ids::{IncidentId, ResourceId};
use crate::incident::{IncidentKind, Severity};
use crate::resource::ResourceKind;

/// Resource -> incident mapping. Ordered so output is reproducible.
pub type AssignmentMap = BTreeMap<ResourceId, IncidentId>;

/// Cost breakdown for a single feasible pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub resource_id: ResourceId,
    pub incident_id: IncidentId,
    /// Optimizer cost (lower is better).
    pub cost: f64,
    /// Travel time in seconds.
    pub estimated_response_seconds: f64,
}

/// A committed assignment enriched with the context a dispatcher needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentDetail {
    pub resource_id: ResourceId,
    pub resource_kind: ResourceKind,
    pub incident_id: IncidentId,
    pub incident_kind: IncidentKind,
    pub severity: Severity,
    pub priority: u8,
    pub cost: f64,
    pub estimated_response_seconds: f64,
}

impl AssignmentDetail {
    /// Sort key: priority ascending, then quickest response first.
    pub fn cmp_dispatch_order(&self, other: &Self) -> std::cmp::Ordering {
        self.priority.cmp(&other.priority).then_with(|| {
            self.estimated_response_seconds
                .total_cmp(&other.estimated_response_seconds)
        })
    }
}
