//! Incident and resource filtering for registry queries.

use respond_models::{Incident, IncidentKind, IncidentStatus, Resource, ResourceKind, Severity};

/// Filter criteria for querying incidents.
#[derive(Debug, Clone, Default)]
pub struct IncidentFilter {
    /// Filter by incident kind.
    pub kind: Option<IncidentKind>,
    /// Filter by exact status.
    pub status: Option<IncidentStatus>,
    /// Keep incidents at or above this severity.
    pub min_severity: Option<Severity>,
    /// Keep only non-retired incidents.
    pub active_only: bool,
}

impl IncidentFilter {
    /// Creates a new empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the kind filter.
    pub fn with_kind(mut self, kind: IncidentKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Sets the status filter.
    pub fn with_status(mut self, status: IncidentStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the minimum severity.
    pub fn with_min_severity(mut self, severity: Severity) -> Self {
        self.min_severity = Some(severity);
        self
    }

    /// Excludes resolved and false-alarm incidents.
    pub fn active(mut self) -> Self {
        self.active_only = true;
        self
    }

    /// Returns true if the incident matches this filter.
    pub fn matches(&self, incident: &Incident) -> bool {
        if let Some(kind) = self.kind {
            if incident.kind != kind {
                return false;
            }
        }

        if let Some(status) = self.status {
            if incident.status != status {
                return false;
            }
        }

        if let Some(min) = self.min_severity {
            if incident.severity < min {
                return false;
            }
        }

        !self.active_only || incident.is_active()
    }
}

/// Filter criteria for querying resources.
#[derive(Debug, Clone, Default)]
pub struct ResourceFilter {
    /// Filter by resource kind.
    pub kind: Option<ResourceKind>,
    /// Filter by availability.
    pub available: Option<bool>,
    /// Keep resources able to serve this incident kind.
    pub serves: Option<IncidentKind>,
}

impl ResourceFilter {
    /// Creates a new empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the kind filter.
    pub fn with_kind(mut self, kind: ResourceKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Sets the availability filter.
    pub fn with_available(mut self, available: bool) -> Self {
        self.available = Some(available);
        self
    }

    /// Keeps only resources compatible with `kind`.
    pub fn serving(mut self, kind: IncidentKind) -> Self {
        self.serves = Some(kind);
        self
    }

    /// Returns true if the resource matches this filter.
    pub fn matches(&self, resource: &Resource) -> bool {
        if let Some(kind) = self.kind {
            if resource.kind != kind {
                return false;
            }
        }

        if let Some(available) = self.available {
            if resource.available != available {
                return false;
            }
        }

        if let Some(incident_kind) = self.serves {
            if !resource.kind.can_serve(incident_kind) {
                return false;
            }
        }

        true
    }
}
