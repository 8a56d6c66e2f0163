//! ResponseEngine - the single handle over dispatch, evacuation and
//! notification planning.
//!
//! Pub/sub follows the usual pattern:
//! - `Arc<RwLock<Vec<Sender>>>` holds one sender per subscriber
//! - every state change is broadcast after it succeeds
//! - disconnected subscribers are dropped on the next broadcast

use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, RwLock};

use respond_comms::CommunicationScheduler;
use respond_dispatch::{DispatchError, DispatchRegistry, IncidentFilter, IngestReport, ResourceFilter};
use respond_evacuation::EvacuationPlanner;
use respond_models::{
    AssignmentDetail, AssignmentMap, CommunicationPlan, CrowdDistribution, EvacuationPlan,
    Incident, IncidentId, IncidentStatus, Location, Resource, ResourceId, VenueLayout,
};
use respond_optimizer::AssignmentOptimizer;
use respond_persistence::Scenario;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::notice::EngineNotice;

/// Per-section outcome of loading a scenario.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScenarioReport {
    pub incidents: IngestReport,
    pub resources: IngestReport,
}

impl ScenarioReport {
    /// Returns true if nothing was rejected.
    pub fn is_clean(&self) -> bool {
        self.incidents.is_clean() && self.resources.is_clean()
    }
}

/// Emergency response engine.
///
/// Construct once and share by clone; clones see the same registry and
/// subscriber list.
///
/// # Example
///
/// ```
/// use respond_engine::{EngineNotice, ResponseEngine};
/// use respond_models::{Incident, IncidentKind, Resource, ResourceKind, Severity};
///
/// let engine = ResponseEngine::default();
/// let notices = engine.subscribe();
///
/// engine.add_resource(Resource::new(ResourceKind::Ambulance, (0.0, 0.0))).unwrap();
/// let incident = Incident::new(IncidentKind::Medical, (3.0, 4.0), Severity::High);
/// let incident_id = engine.add_incident(incident).unwrap();
/// engine.optimize_assignments().unwrap();
///
/// let plan = engine.communication_plan_for(&incident_id).unwrap();
/// assert_eq!(plan.contacts.len(), 3);
/// assert_eq!(notices.try_iter().count(), 3);
/// ```
#[derive(Clone, Default)]
pub struct ResponseEngine {
    config: EngineConfig,
    registry: DispatchRegistry,
    planner: EvacuationPlanner,
    scheduler: CommunicationScheduler,
    subscribers: Arc<RwLock<Vec<Sender<EngineNotice>>>>,
}

impl ResponseEngine {
    /// Creates an engine with the given config.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            registry: DispatchRegistry::new(AssignmentOptimizer::new(config.optimizer.clone())),
            planner: EvacuationPlanner::new(config.evacuation.clone()),
            scheduler: CommunicationScheduler::new(config.scheduler.clone()),
            config,
            subscribers: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Creates an engine from a config file plus environment overrides.
    pub fn from_config_file(path: Option<&Path>) -> Result<Self> {
        Ok(Self::new(EngineConfig::load(path)?))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The underlying registry.
    pub fn registry(&self) -> &DispatchRegistry {
        &self.registry
    }

    // ── pub/sub ─────────────────────────────────────────────────────────

    /// Subscribes to engine notices.
    ///
    /// Each subscriber gets its own channel; the engine keeps the sender.
    pub fn subscribe(&self) -> Receiver<EngineNotice> {
        let (tx, rx) = mpsc::channel();
        if let Ok(mut subs) = self.subscribers.write() {
            subs.push(tx);
        }
        rx
    }

    /// Number of live subscribers (as of the last broadcast).
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().map(|s| s.len()).unwrap_or(0)
    }

    fn broadcast(&self, notice: EngineNotice) {
        debug!(notice = notice.label(), "broadcasting");
        if let Ok(mut subs) = self.subscribers.write() {
            subs.retain(|tx| tx.send(notice.clone()).is_ok());
        }
    }

    // ── registration ────────────────────────────────────────────────────

    /// Validates and upserts an incident.
    pub fn add_incident(&self, incident: Incident) -> Result<IncidentId> {
        let incident_id = self.registry.add_incident(incident)?;
        self.broadcast(EngineNotice::IncidentRegistered {
            incident_id: incident_id.clone(),
        });
        Ok(incident_id)
    }

    /// Validates and upserts a resource.
    pub fn add_resource(&self, resource: Resource) -> Result<ResourceId> {
        let resource_id = self.registry.add_resource(resource)?;
        self.broadcast(EngineNotice::ResourceRegistered {
            resource_id: resource_id.clone(),
        });
        Ok(resource_id)
    }

    /// Upserts a batch of incidents, skipping invalid ones.
    pub fn add_incidents(&self, incidents: Vec<Incident>) -> IngestReport {
        let report = self.registry.add_incidents(incidents);
        self.announce_incidents(&report);
        report
    }

    /// Upserts a batch of resources, skipping invalid ones.
    pub fn add_resources(&self, resources: Vec<Resource>) -> IngestReport {
        let report = self.registry.add_resources(resources);
        self.announce_resources(&report);
        report
    }

    /// Parses and upserts every incident and resource in a scenario.
    ///
    /// Resources go first so a later optimization sees the full pool.
    pub fn ingest_json(&self, scenario: &Scenario) -> ScenarioReport {
        let resources = self.registry.ingest_resources_json(&scenario.resources);
        self.announce_resources(&resources);
        let incidents = self.registry.ingest_incidents_json(&scenario.incidents);
        self.announce_incidents(&incidents);

        info!(
            incidents = incidents.accepted.len(),
            resources = resources.accepted.len(),
            rejected = incidents.rejected.len() + resources.rejected.len(),
            "scenario ingested"
        );
        ScenarioReport {
            incidents,
            resources,
        }
    }

    fn announce_incidents(&self, report: &IngestReport) {
        for id in &report.accepted {
            self.broadcast(EngineNotice::IncidentRegistered {
                incident_id: IncidentId::from(id.as_str()),
            });
        }
    }

    fn announce_resources(&self, report: &IngestReport) {
        for id in &report.accepted {
            self.broadcast(EngineNotice::ResourceRegistered {
                resource_id: ResourceId::from(id.as_str()),
            });
        }
    }

    // ── lifecycle ───────────────────────────────────────────────────────

    /// Moves an incident through the status state machine.
    pub fn transition_incident(&self, id: &IncidentId, status: IncidentStatus) -> Result<()> {
        self.registry.transition_incident(id, status)?;
        self.broadcast(EngineNotice::IncidentStatusChanged {
            incident_id: id.clone(),
            status,
        });
        Ok(())
    }

    /// Returns a resource to the available pool.
    pub fn release_resource(&self, id: &ResourceId) -> Result<Option<IncidentId>> {
        let previous = self.registry.release_resource(id)?;
        self.broadcast(EngineNotice::ResourceReleased {
            resource_id: id.clone(),
            incident_id: previous.clone(),
        });
        Ok(previous)
    }

    /// Releases every resource committed to an incident.
    pub fn release_incident(&self, id: &IncidentId) -> Result<Vec<ResourceId>> {
        let released = self.registry.release_incident(id)?;
        for resource_id in &released {
            self.broadcast(EngineNotice::ResourceReleased {
                resource_id: resource_id.clone(),
                incident_id: Some(id.clone()),
            });
        }
        Ok(released)
    }

    // ── planning ────────────────────────────────────────────────────────

    /// Runs one optimization pass and commits the result.
    pub fn optimize_assignments(&self) -> Result<AssignmentMap> {
        let assignments = self.registry.optimize_assignments()?;
        if !assignments.is_empty() {
            self.broadcast(EngineNotice::AssignmentsCommitted {
                assignments: assignments.clone(),
            });
        }
        Ok(assignments)
    }

    /// Committed assignments sorted by (priority, estimated response seconds).
    pub fn assignment_details(&self) -> Vec<AssignmentDetail> {
        self.registry.assignment_details()
    }

    /// Currently committed resource -> incident mapping.
    pub fn current_assignments(&self) -> AssignmentMap {
        self.registry.current_assignments()
    }

    /// Evacuation plan for zones near `location`.
    pub fn plan_evacuation(
        &self,
        layout: &VenueLayout,
        location: Location,
        crowd: &CrowdDistribution,
    ) -> EvacuationPlan {
        self.planner.plan_evacuation(layout, location, crowd)
    }

    /// Evacuation plan centered on a registered incident.
    pub fn plan_evacuation_for(
        &self,
        incident_id: &IncidentId,
        layout: &VenueLayout,
        crowd: &CrowdDistribution,
    ) -> Result<EvacuationPlan> {
        let incident = self.require_incident(incident_id)?;
        Ok(self.plan_evacuation(layout, incident.location, crowd))
    }

    /// Notification plan for an incident under the given assignment.
    pub fn build_communication_plan(
        &self,
        incident: &Incident,
        assignments: &AssignmentMap,
    ) -> CommunicationPlan {
        self.scheduler.build_communication_plan(incident, assignments)
    }

    /// Notification plan for a registered incident under the committed assignment.
    pub fn communication_plan_for(&self, incident_id: &IncidentId) -> Result<CommunicationPlan> {
        let incident = self.require_incident(incident_id)?;
        Ok(self.build_communication_plan(&incident, &self.current_assignments()))
    }

    // ── queries ─────────────────────────────────────────────────────────

    pub fn get_incident(&self, id: &IncidentId) -> Option<Incident> {
        self.registry.get_incident(id)
    }

    pub fn get_resource(&self, id: &ResourceId) -> Option<Resource> {
        self.registry.get_resource(id)
    }

    pub fn list_incidents(&self, filter: Option<IncidentFilter>) -> Vec<Incident> {
        self.registry.list_incidents(filter)
    }

    pub fn list_resources(&self, filter: Option<ResourceFilter>) -> Vec<Resource> {
        self.registry.list_resources(filter)
    }

    fn require_incident(&self, id: &IncidentId) -> Result<Incident> {
        self.registry
            .get_incident(id)
            .ok_or_else(|| DispatchError::IncidentNotFound(id.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use respond_evacuation::EvacuationConfig;
    use respond_models::{Exit, IncidentKind, ResourceKind, Severity, Zone, ZoneId};

    fn engine() -> ResponseEngine {
        ResponseEngine::default()
    }

    #[test]
    fn test_subscribe_receives_registration() {
        let engine = engine();
        let rx = engine.subscribe();

        engine
            .add_resource(Resource::new(ResourceKind::FireTruck, (0.0, 0.0)).with_id("truck-1"))
            .unwrap();

        assert_eq!(
            rx.try_recv().unwrap(),
            EngineNotice::ResourceRegistered {
                resource_id: "truck-1".into()
            }
        );
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let engine = engine();
        let kept = engine.subscribe();
        drop(engine.subscribe());
        assert_eq!(engine.subscriber_count(), 2);

        engine
            .add_incident(Incident::new(IncidentKind::Fire, (0.0, 0.0), Severity::Low))
            .unwrap();

        assert_eq!(engine.subscriber_count(), 1);
        assert!(kept.try_recv().is_ok());
    }

    #[test]
    fn test_failed_operation_broadcasts_nothing() {
        let engine = engine();
        let rx = engine.subscribe();

        let result = engine.add_incident(
            Incident::new(IncidentKind::Fire, (f64::INFINITY, 0.0), Severity::Low),
        );
        assert!(matches!(result, Err(EngineError::Dispatch(_))));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_optimize_broadcasts_commit() {
        let engine = engine();
        engine
            .add_resource(Resource::new(ResourceKind::Ambulance, (0.0, 0.0)).with_id("amb-1"))
            .unwrap();
        engine
            .add_incident(
                Incident::new(IncidentKind::Medical, (1.0, 0.0), Severity::High).with_id("inc-1"),
            )
            .unwrap();
        let rx = engine.subscribe();

        let map = engine.optimize_assignments().unwrap();
        assert_eq!(
            rx.try_recv().unwrap(),
            EngineNotice::AssignmentsCommitted { assignments: map }
        );

        // Nothing left to assign, so no second notice.
        assert!(engine.optimize_assignments().unwrap().is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_release_incident_broadcasts_each_resource() {
        let engine = engine();
        for id in ["amb-1", "amb-2"] {
            engine
                .add_resource(Resource::new(ResourceKind::Ambulance, (0.0, 0.0)).with_id(id))
                .unwrap();
        }
        engine
            .add_incident(
                Incident::new(IncidentKind::Medical, (1.0, 0.0), Severity::High).with_id("inc-1"),
            )
            .unwrap();
        engine.optimize_assignments().unwrap();
        engine.optimize_assignments().unwrap();

        let rx = engine.subscribe();
        let released = engine.release_incident(&"inc-1".into()).unwrap();
        assert_eq!(released.len(), 2);

        let notices: Vec<EngineNotice> = rx.try_iter().collect();
        assert_eq!(notices.len(), 2);
        assert!(notices
            .iter()
            .all(|n| matches!(n, EngineNotice::ResourceReleased { incident_id: Some(_), .. })));
    }

    #[test]
    fn test_ingest_json_reports_each_section() {
        let engine = engine();
        let scenario = Scenario {
            incidents: vec![
                serde_json::json!({
                    "id": "inc-1", "type": "fire", "location": {"x": 1.0, "y": 1.0},
                    "severity": "high", "priority": 1, "estimated_response_seconds": 180
                }),
                serde_json::json!({"id": "inc-2", "type": "flood"}),
            ],
            resources: vec![serde_json::json!({
                "id": "truck-1", "type": "fire_truck", "location": {"x": 0.0, "y": 0.0}
            })],
            ..Scenario::default()
        };

        let report = engine.ingest_json(&scenario);
        assert_eq!(report.incidents.accepted, vec!["inc-1".to_string()]);
        assert_eq!(report.incidents.rejected.len(), 1);
        assert!(report.resources.is_clean());
        assert!(!report.is_clean());
    }

    #[test]
    fn test_plan_evacuation_for_unknown_incident() {
        let result = engine().plan_evacuation_for(
            &"ghost".into(),
            &VenueLayout::default(),
            &CrowdDistribution::new(),
        );
        assert!(matches!(
            result,
            Err(EngineError::Dispatch(DispatchError::IncidentNotFound(_)))
        ));
    }

    #[test]
    fn test_plan_evacuation_uses_config() {
        let engine = ResponseEngine::new(
            EngineConfig::new().with_evacuation(EvacuationConfig::new().with_danger_radius(5.0)),
        );
        let incident_id = engine
            .add_incident(Incident::new(IncidentKind::Fire, (0.0, 0.0), Severity::Critical))
            .unwrap();
        let layout = VenueLayout::new(
            vec![Exit::new("E1", "Gate", (0.0, 100.0), 500)],
            vec![Zone::new("near", (3.0, 0.0), 50), Zone::new("far", (30.0, 0.0), 50)],
        );
        let crowd = CrowdDistribution::from([(ZoneId::from("near"), 10), (ZoneId::from("far"), 10)]);

        let plan = engine.plan_evacuation_for(&incident_id, &layout, &crowd).unwrap();
        assert_eq!(plan.affected_zones, vec![ZoneId::from("near")]);
    }

    #[test]
    fn test_transition_broadcasts_status() {
        let engine = engine();
        let incident_id = engine
            .add_incident(Incident::new(IncidentKind::Security, (0.0, 0.0), Severity::Medium))
            .unwrap();
        let rx = engine.subscribe();

        engine
            .transition_incident(&incident_id, IncidentStatus::FalseAlarm)
            .unwrap();
        assert_eq!(
            rx.try_recv().unwrap(),
            EngineNotice::IncidentStatusChanged {
                incident_id,
                status: IncidentStatus::FalseAlarm
            }
        );
    }
}
