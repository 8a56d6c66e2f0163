//! DispatchRegistry - incident registry and resource pool behind one lock.
//!
//! Concurrency model:
//! - `Arc<Mutex<T>>` guards incidents, resources and committed assignments
//!   together, so every mutation is serialized through a single writer
//! - Optimization is snapshot -> solve -> commit; only snapshot and commit
//!   take the lock, the solve runs on owned copies
//! - Commit re-checks each pair, so concurrent passes can never assign a
//!   resource twice

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use respond_models::{
    Assignment, AssignmentDetail, AssignmentMap, Incident, IncidentId, IncidentStatus, Resource,
    ResourceId, ValidationError,
};
use respond_optimizer::AssignmentOptimizer;
use tracing::{debug, info, warn};

use crate::error::{DispatchError, Result};
use crate::filter::{IncidentFilter, ResourceFilter};
use crate::ingest::{raw_id, IngestReport};

/// Internal state of the registry.
#[derive(Default)]
struct RegistryState {
    incidents: HashMap<IncidentId, Incident>,
    resources: HashMap<ResourceId, Resource>,
    /// Committed assignments keyed by resource.
    assignments: HashMap<ResourceId, Assignment>,
}

/// Immutable copy of the optimizer inputs.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Resources that were available when the snapshot was taken.
    pub resources: Vec<Resource>,
    /// Incidents that were not retired when the snapshot was taken.
    pub incidents: Vec<Incident>,
}

/// Thread-safe incident registry and resource pool.
///
/// # Example
///
/// ```
/// use respond_dispatch::DispatchRegistry;
/// use respond_models::{Incident, IncidentKind, Resource, ResourceKind, Severity};
///
/// let registry = DispatchRegistry::default();
/// registry.add_resource(Resource::new(ResourceKind::Ambulance, (100.0, 200.0))).unwrap();
/// registry.add_incident(Incident::new(IncidentKind::Medical, (110.0, 205.0), Severity::High)).unwrap();
///
/// let assignments = registry.optimize_assignments().unwrap();
/// assert_eq!(assignments.len(), 1);
/// assert_eq!(registry.available_count(), 0);
/// ```
#[derive(Clone, Default)]
pub struct DispatchRegistry {
    optimizer: AssignmentOptimizer,
    state: Arc<Mutex<RegistryState>>,
}

impl DispatchRegistry {
    /// Creates an empty registry using the given optimizer.
    pub fn new(optimizer: AssignmentOptimizer) -> Self {
        Self {
            optimizer,
            state: Arc::new(Mutex::new(RegistryState::default())),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, RegistryState>> {
        self.state
            .lock()
            .map_err(|e| DispatchError::LockPoisoned(e.to_string()))
    }

    pub fn optimizer(&self) -> &AssignmentOptimizer {
        &self.optimizer
    }

    // ── registration ────────────────────────────────────────────────────

    /// Validates and upserts an incident by id.
    ///
    /// Re-registering a known incident keeps its stored status; status only
    /// changes through `transition_incident`. Changing the type of an
    /// incident that holds committed resources is rejected.
    pub fn add_incident(&self, mut incident: Incident) -> Result<IncidentId> {
        incident.validate()?;
        let id = incident.id.clone();

        let mut state = self.lock()?;
        if let Some(existing) = state.incidents.get(&id) {
            if existing.kind != incident.kind {
                let committed = state
                    .resources
                    .values()
                    .filter(|r| r.current_assignment.as_ref() == Some(&id))
                    .count();
                if committed > 0 {
                    return Err(DispatchError::KindConflict {
                        id: id.to_string(),
                        from: existing.kind,
                        to: incident.kind,
                        committed,
                    });
                }
            }
            incident.status = existing.status;
        }
        let replaced = state.incidents.insert(id.clone(), incident).is_some();
        info!(incident_id = %id, replaced, "incident registered");

        Ok(id)
    }

    /// Validates and upserts a resource by id.
    ///
    /// A resource currently committed to an incident keeps its assignment;
    /// only `release_resource` returns it to the pool.
    pub fn add_resource(&self, mut resource: Resource) -> Result<ResourceId> {
        resource.validate()?;
        let id = resource.id.clone();

        let mut state = self.lock()?;
        if let Some(existing) = state.resources.get(&id) {
            if let Some(incident_id) = &existing.current_assignment {
                resource.assign(incident_id.clone());
            }
        }
        let replaced = state.resources.insert(id.clone(), resource).is_some();
        info!(resource_id = %id, replaced, "resource registered");

        Ok(id)
    }

    /// Upserts a batch of incidents, skipping invalid ones.
    pub fn add_incidents(&self, incidents: Vec<Incident>) -> IngestReport {
        let mut report = IngestReport::new();
        for (index, incident) in incidents.into_iter().enumerate() {
            let id = incident.id.to_string();
            match self.add_incident(incident) {
                Ok(id) => report.accept(id.as_str()),
                Err(e) => self.record_rejection(&mut report, index, Some(id), e, "incident"),
            }
        }
        report
    }

    /// Upserts a batch of resources, skipping invalid ones.
    pub fn add_resources(&self, resources: Vec<Resource>) -> IngestReport {
        let mut report = IngestReport::new();
        for (index, resource) in resources.into_iter().enumerate() {
            let id = resource.id.to_string();
            match self.add_resource(resource) {
                Ok(id) => report.accept(id.as_str()),
                Err(e) => self.record_rejection(&mut report, index, Some(id), e, "resource"),
            }
        }
        report
    }

    /// Parses and upserts raw incident payloads one by one.
    ///
    /// Unknown kinds, unknown fields and missing locations are reported as
    /// malformed without affecting the rest of the batch.
    pub fn ingest_incidents_json(&self, items: &[serde_json::Value]) -> IngestReport {
        let mut report = IngestReport::new();
        for (index, item) in items.iter().enumerate() {
            match serde_json::from_value::<Incident>(item.clone()) {
                Ok(incident) => match self.add_incident(incident) {
                    Ok(id) => report.accept(id.as_str()),
                    Err(e) => self.record_rejection(&mut report, index, raw_id(item), e, "incident"),
                },
                Err(e) => {
                    let error = ValidationError::Malformed {
                        entity: "incident",
                        reason: e.to_string(),
                    };
                    self.record_rejection(&mut report, index, raw_id(item), error.into(), "incident")
                }
            }
        }
        report
    }

    /// Parses and upserts raw resource payloads one by one.
    pub fn ingest_resources_json(&self, items: &[serde_json::Value]) -> IngestReport {
        let mut report = IngestReport::new();
        for (index, item) in items.iter().enumerate() {
            match serde_json::from_value::<Resource>(item.clone()) {
                Ok(resource) => match self.add_resource(resource) {
                    Ok(id) => report.accept(id.as_str()),
                    Err(e) => self.record_rejection(&mut report, index, raw_id(item), e, "resource"),
                },
                Err(e) => {
                    let error = ValidationError::Malformed {
                        entity: "resource",
                        reason: e.to_string(),
                    };
                    self.record_rejection(&mut report, index, raw_id(item), error.into(), "resource")
                }
            }
        }
        report
    }

    fn record_rejection(
        &self,
        report: &mut IngestReport,
        index: usize,
        id: Option<String>,
        error: DispatchError,
        entity: &'static str,
    ) {
        warn!(entity, index, id = ?id, error = %error, "skipping item");
        let error = match error {
            DispatchError::Validation(v) => v,
            other => ValidationError::Malformed {
                entity,
                reason: other.to_string(),
            },
        };
        report.reject(index, id, error);
    }

    // ── lifecycle ───────────────────────────────────────────────────────

    /// Moves an incident through the status state machine.
    pub fn transition_incident(&self, id: &IncidentId, status: IncidentStatus) -> Result<()> {
        let mut state = self.lock()?;
        let incident = state
            .incidents
            .get_mut(id)
            .ok_or_else(|| DispatchError::IncidentNotFound(id.to_string()))?;

        if !incident.status.can_transition_to(status) {
            return Err(DispatchError::InvalidTransition {
                id: id.to_string(),
                from: incident.status,
                to: status,
            });
        }

        let from = incident.status;
        incident.status = status;
        info!(incident_id = %id, %from, to = %status, "incident status changed");
        Ok(())
    }

    /// Returns a resource to the available pool.
    ///
    /// Returns the incident it was released from, if it was assigned.
    pub fn release_resource(&self, id: &ResourceId) -> Result<Option<IncidentId>> {
        let mut state = self.lock()?;
        let resource = state
            .resources
            .get_mut(id)
            .ok_or_else(|| DispatchError::ResourceNotFound(id.to_string()))?;

        let previous = resource.current_assignment.take();
        resource.release();
        state.assignments.remove(id);

        info!(resource_id = %id, incident_id = ?previous, "resource released");
        Ok(previous)
    }

    /// Releases every resource committed to an incident.
    pub fn release_incident(&self, id: &IncidentId) -> Result<Vec<ResourceId>> {
        let mut state = self.lock()?;
        if !state.incidents.contains_key(id) {
            return Err(DispatchError::IncidentNotFound(id.to_string()));
        }

        let mut released: Vec<ResourceId> = state
            .resources
            .values_mut()
            .filter(|r| r.current_assignment.as_ref() == Some(id))
            .map(|r| {
                r.release();
                r.id.clone()
            })
            .collect();
        released.sort();

        for resource_id in &released {
            state.assignments.remove(resource_id);
        }

        info!(incident_id = %id, count = released.len(), "incident resources released");
        Ok(released)
    }

    // ── optimization ────────────────────────────────────────────────────

    /// Copies the available resources and active incidents.
    pub fn snapshot(&self) -> Result<Snapshot> {
        let state = self.lock()?;
        let mut resources: Vec<Resource> = state
            .resources
            .values()
            .filter(|r| r.available)
            .cloned()
            .collect();
        let mut incidents: Vec<Incident> = state
            .incidents
            .values()
            .filter(|i| i.is_active())
            .cloned()
            .collect();

        // Stable input order keeps tie-breaking reproducible.
        resources.sort_by(|a, b| a.id.cmp(&b.id));
        incidents.sort_by(|a, b| a.id.cmp(&b.id));

        Ok(Snapshot {
            resources,
            incidents,
        })
    }

    /// Atomically marks matched resources unavailable.
    ///
    /// Pairs whose resource was taken or whose incident retired since the
    /// snapshot are skipped. Returns the pairs actually committed.
    pub fn commit(&self, proposed: Vec<Assignment>) -> Result<Vec<Assignment>> {
        let mut state = self.lock()?;
        let mut committed = Vec::with_capacity(proposed.len());

        for assignment in proposed {
            let incident_kind = state
                .incidents
                .get(&assignment.incident_id)
                .filter(|i| i.is_active())
                .map(|i| i.kind);
            let Some(incident_kind) = incident_kind else {
                warn!(
                    resource_id = %assignment.resource_id,
                    incident_id = %assignment.incident_id,
                    "incident no longer active, dropping pair"
                );
                continue;
            };

            let Some(resource) = state.resources.get_mut(&assignment.resource_id) else {
                warn!(resource_id = %assignment.resource_id, "resource vanished, dropping pair");
                continue;
            };
            if !resource.available {
                warn!(
                    resource_id = %assignment.resource_id,
                    incident_id = %assignment.incident_id,
                    "resource already committed, dropping pair"
                );
                continue;
            }
            if !resource.kind.can_serve(incident_kind) {
                warn!(
                    resource_id = %assignment.resource_id,
                    incident_id = %assignment.incident_id,
                    "resource cannot serve incident type, dropping pair"
                );
                continue;
            }

            resource.assign(assignment.incident_id.clone());
            state
                .assignments
                .insert(assignment.resource_id.clone(), assignment.clone());
            committed.push(assignment);
        }

        Ok(committed)
    }

    /// Snapshot, solve and commit in one call.
    pub fn optimize_assignments(&self) -> Result<AssignmentMap> {
        let snapshot = self.snapshot()?;
        debug!(
            resources = snapshot.resources.len(),
            incidents = snapshot.incidents.len(),
            "optimizing assignments"
        );

        let proposed = self
            .optimizer
            .solve(&snapshot.resources, &snapshot.incidents);
        let proposed_count = proposed.len();
        let committed = self.commit(proposed)?;

        info!(
            proposed = proposed_count,
            committed = committed.len(),
            "assignments committed"
        );

        Ok(committed
            .into_iter()
            .map(|a| (a.resource_id, a.incident_id))
            .collect())
    }

    /// Committed assignments enriched with incident/resource context,
    /// sorted by (priority, estimated response seconds).
    pub fn assignment_details(&self) -> Vec<AssignmentDetail> {
        let state = match self.lock() {
            Ok(s) => s,
            Err(_) => return Vec::new(),
        };

        let mut details: Vec<AssignmentDetail> = state
            .assignments
            .values()
            .filter_map(|a| {
                let resource = state.resources.get(&a.resource_id)?;
                let incident = state.incidents.get(&a.incident_id)?;
                Some(AssignmentDetail {
                    resource_id: a.resource_id.clone(),
                    resource_kind: resource.kind,
                    incident_id: a.incident_id.clone(),
                    incident_kind: incident.kind,
                    severity: incident.severity,
                    priority: incident.priority,
                    cost: a.cost,
                    estimated_response_seconds: a.estimated_response_seconds,
                })
            })
            .collect();

        details.sort_by(|a, b| {
            a.cmp_dispatch_order(b)
                .then_with(|| a.resource_id.cmp(&b.resource_id))
        });
        details
    }

    /// Currently committed resource -> incident mapping.
    pub fn current_assignments(&self) -> AssignmentMap {
        self.lock()
            .map(|s| {
                s.assignments
                    .values()
                    .map(|a| (a.resource_id.clone(), a.incident_id.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    // ── queries ─────────────────────────────────────────────────────────

    /// Gets an incident by id.
    pub fn get_incident(&self, id: &IncidentId) -> Option<Incident> {
        let state = self.lock().ok()?;
        state.incidents.get(id).cloned()
    }

    /// Gets a resource by id.
    pub fn get_resource(&self, id: &ResourceId) -> Option<Resource> {
        let state = self.lock().ok()?;
        state.resources.get(id).cloned()
    }

    /// Lists incidents, optionally filtered.
    ///
    /// Sorted by priority (highest first), then detection time (oldest first).
    pub fn list_incidents(&self, filter: Option<IncidentFilter>) -> Vec<Incident> {
        let state = match self.lock() {
            Ok(s) => s,
            Err(_) => return Vec::new(),
        };

        let mut incidents: Vec<Incident> = state
            .incidents
            .values()
            .filter(|i| filter.as_ref().map(|f| f.matches(i)).unwrap_or(true))
            .cloned()
            .collect();

        incidents.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.detected_at.cmp(&b.detected_at))
                .then_with(|| a.id.cmp(&b.id))
        });
        incidents
    }

    /// Lists resources, optionally filtered, ordered by id.
    pub fn list_resources(&self, filter: Option<ResourceFilter>) -> Vec<Resource> {
        let state = match self.lock() {
            Ok(s) => s,
            Err(_) => return Vec::new(),
        };

        let mut resources: Vec<Resource> = state
            .resources
            .values()
            .filter(|r| filter.as_ref().map(|f| f.matches(r)).unwrap_or(true))
            .cloned()
            .collect();
        resources.sort_by(|a, b| a.id.cmp(&b.id));
        resources
    }

    /// Number of incidents (all statuses).
    pub fn incident_count(&self) -> usize {
        self.lock().map(|s| s.incidents.len()).unwrap_or(0)
    }

    /// Number of resources (all states).
    pub fn resource_count(&self) -> usize {
        self.lock().map(|s| s.resources.len()).unwrap_or(0)
    }

    /// Number of resources free for assignment.
    pub fn available_count(&self) -> usize {
        self.lock()
            .map(|s| s.resources.values().filter(|r| r.available).count())
            .unwrap_or(0)
    }
}
