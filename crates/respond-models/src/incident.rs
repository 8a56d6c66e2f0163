//! Incident types.
//!
//! Incidents are emitted by the detection pipeline or reported manually and
//! move through a small status state machine until an external caller
//! retires them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::{Result, ValidationError};
use crate::geo::Location;
use crate::ids::IncidentId;
use crate::resource::ResourceKind;

/// Kind of emergency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentKind {
    Medical,
    Fire,
    Security,
}

impl IncidentKind {
    /// Urgency weight used by the assignment cost. Lower = more urgent.
    pub fn priority_weight(&self) -> f64 {
        match self {
            IncidentKind::Fire => 1.0,
            IncidentKind::Medical => 2.0,
            IncidentKind::Security => 3.0,
        }
    }

    /// Resource kinds able to respond to this kind of incident.
    pub fn compatible_resources(&self) -> &'static [ResourceKind] {
        match self {
            IncidentKind::Medical => &[ResourceKind::MedicalPersonnel, ResourceKind::Ambulance],
            IncidentKind::Fire => &[ResourceKind::FirePersonnel, ResourceKind::FireTruck],
            IncidentKind::Security => {
                &[ResourceKind::SecurityPersonnel, ResourceKind::PoliceCar]
            }
        }
    }

    /// Default dispatch priority for a freshly detected incident (1 = highest).
    pub fn default_priority(&self) -> u8 {
        match self {
            IncidentKind::Medical | IncidentKind::Fire => 1,
            IncidentKind::Security => 2,
        }
    }

    /// Target response time in seconds.
    pub fn target_response_seconds(&self) -> u32 {
        match self {
            IncidentKind::Medical => 300,
            IncidentKind::Fire => 180,
            IncidentKind::Security => 120,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentKind::Medical => "medical",
            IncidentKind::Fire => "fire",
            IncidentKind::Security => "security",
        }
    }
}

impl fmt::Display for IncidentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Incident severity.
///
/// Ordered Low < Medium < High < Critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Divisor applied to the assignment cost; more severe = cheaper to serve.
    pub fn multiplier(&self) -> f64 {
        match self {
            Severity::Low => 1.0,
            Severity::Medium => 2.0,
            Severity::High => 3.0,
            Severity::Critical => 4.0,
        }
    }

    /// High and critical incidents warrant a public announcement.
    pub fn is_severe(&self) -> bool {
        matches!(self, Severity::High | Severity::Critical)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of an incident.
///
/// ```text
/// detected -> confirmed -> responding -> resolved
///     \___________\_____________\-----> false_alarm
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    #[default]
    Detected,
    Confirmed,
    Responding,
    Resolved,
    FalseAlarm,
}

impl IncidentStatus {
    /// Active incidents participate in optimization.
    pub fn is_active(&self) -> bool {
        !self.is_retired()
    }

    /// Resolved and false-alarm incidents are terminal.
    pub fn is_retired(&self) -> bool {
        matches!(self, IncidentStatus::Resolved | IncidentStatus::FalseAlarm)
    }

    /// Returns true if the state machine allows moving to `next`.
    pub fn can_transition_to(&self, next: IncidentStatus) -> bool {
        use IncidentStatus::*;
        match (self, next) {
            (Detected, Confirmed) | (Confirmed, Responding) | (Responding, Resolved) => true,
            (from, FalseAlarm) => from.is_active(),
            _ => false,
        }
    }
}

impl fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IncidentStatus::Detected => "detected",
            IncidentStatus::Confirmed => "confirmed",
            IncidentStatus::Responding => "responding",
            IncidentStatus::Resolved => "resolved",
            IncidentStatus::FalseAlarm => "false_alarm",
        };
        f.write_str(s)
    }
}

/// An emergency requiring a resource response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Incident {
    /// Unique identifier for the incident.
    pub id: IncidentId,

    /// Kind of emergency.
    #[serde(rename = "type")]
    pub kind: IncidentKind,

    /// Where the incident was detected.
    pub location: Location,

    pub severity: Severity,

    /// Dispatch priority, 1 (highest) to 5 (lowest).
    pub priority: u8,

    /// When the incident was detected.
    #[serde(default = "Utc::now")]
    pub detected_at: DateTime<Utc>,

    /// Target response time in seconds.
    pub estimated_response_seconds: u32,

    /// Capabilities a responder should ideally carry.
    #[serde(default)]
    pub required_capabilities: BTreeSet<String>,

    #[serde(default)]
    pub status: IncidentStatus,
}

impl Incident {
    /// Creates a detected incident with kind-based priority and target time.
    pub fn new(kind: IncidentKind, location: impl Into<Location>, severity: Severity) -> Self {
        Self {
            id: IncidentId::new(),
            kind,
            location: location.into(),
            severity,
            priority: kind.default_priority(),
            detected_at: Utc::now(),
            estimated_response_seconds: kind.target_response_seconds(),
            required_capabilities: BTreeSet::new(),
            status: IncidentStatus::Detected,
        }
    }

    /// Sets the incident id.
    pub fn with_id(mut self, id: impl Into<IncidentId>) -> Self {
        self.id = id.into();
        self
    }

    /// Sets the dispatch priority.
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    /// Adds a required capability.
    pub fn requires(mut self, capability: impl Into<String>) -> Self {
        self.required_capabilities.insert(capability.into());
        self
    }

    /// Sets the detection timestamp.
    pub fn detected_at(mut self, at: DateTime<Utc>) -> Self {
        self.detected_at = at;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Checks the fields serde cannot: id, coordinates and priority range.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_blank() {
            return Err(ValidationError::EmptyId { entity: "incident" });
        }
        if !self.location.is_finite() {
            return Err(ValidationError::NonFiniteLocation {
                entity: "incident",
                id: self.id.to_string(),
            });
        }
        if !(1..=5).contains(&self.priority) {
            return Err(ValidationError::PriorityOutOfRange {
                id: self.id.to_string(),
                priority: self.priority,
            });
        }
        Ok(())
    }
}
