//! Notices broadcast to engine subscribers.

use respond_models::{AssignmentMap, IncidentId, IncidentStatus, ResourceId};
use serde::{Deserialize, Serialize};

/// A state change an external transport may want to forward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "notice", rename_all = "snake_case")]
pub enum EngineNotice {
    IncidentRegistered {
        incident_id: IncidentId,
    },
    IncidentStatusChanged {
        incident_id: IncidentId,
        status: IncidentStatus,
    },
    ResourceRegistered {
        resource_id: ResourceId,
    },
    /// Pairs committed by one optimization pass.
    AssignmentsCommitted {
        assignments: AssignmentMap,
    },
    ResourceReleased {
        resource_id: ResourceId,
        #[serde(skip_serializing_if = "Option::is_none")]
        incident_id: Option<IncidentId>,
    },
}

impl EngineNotice {
    /// Short label used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            EngineNotice::IncidentRegistered { .. } => "incident_registered",
            EngineNotice::IncidentStatusChanged { .. } => "incident_status_changed",
            EngineNotice::ResourceRegistered { .. } => "resource_registered",
            EngineNotice::AssignmentsCommitted { .. } => "assignments_committed",
            EngineNotice::ResourceReleased { .. } => "resource_released",
        }
    }
}
