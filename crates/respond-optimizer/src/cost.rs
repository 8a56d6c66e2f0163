//! Assignment cost model.
//!
//! ```text
//! cost = (travel_seconds / 60) * type_weight * capability_penalty / severity_multiplier
//! travel_seconds = distance * 60 * response_time_factor
//! ```
//!
//! Incompatible pairs cost `f64::INFINITY`.

use respond_models::{Assignment, Incident, Resource};

/// Penalty multiplier per required capability the resource carries.
pub const CAPABILITY_MATCH_FACTOR: f64 = 0.8;

/// Travel time in seconds, assuming one distance unit per minute.
pub fn travel_time_seconds(resource: &Resource, incident: &Incident) -> f64 {
    resource.location.distance_to(&incident.location) * 60.0 * resource.response_time_factor
}

/// 0.8 per matched capability; lower means a better match.
pub fn capability_penalty(resource: &Resource, incident: &Incident) -> f64 {
    let matched = incident
        .required_capabilities
        .iter()
        .filter(|c| resource.capabilities.contains(*c))
        .count();
    CAPABILITY_MATCH_FACTOR.powi(matched as i32)
}

/// Returns true if the resource kind is in the incident's compatibility table.
pub fn is_feasible(resource: &Resource, incident: &Incident) -> bool {
    resource.kind.can_serve(incident.kind)
}

/// Cost of sending `resource` to `incident`.
pub fn pair_cost(resource: &Resource, incident: &Incident) -> f64 {
    if !is_feasible(resource, incident) {
        return f64::INFINITY;
    }
    (travel_time_seconds(resource, incident) / 60.0)
        * incident.kind.priority_weight()
        * capability_penalty(resource, incident)
        / incident.severity.multiplier()
}

/// Cost breakdown for one pair, or `None` if the pair is infeasible.
pub fn explain(resource: &Resource, incident: &Incident) -> Option<Assignment> {
    if !is_feasible(resource, incident) {
        return None;
    }
    Some(Assignment {
        resource_id: resource.id.clone(),
        incident_id: incident.id.clone(),
        cost: pair_cost(resource, incident),
        estimated_response_seconds: travel_time_seconds(resource, incident),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use respond_models::{IncidentKind, ResourceKind, Severity};

    fn ambulance() -> Resource {
        Resource::new(ResourceKind::Ambulance, (0.0, 0.0)).with_id("amb-1")
    }

    #[test]
    fn test_travel_time() {
        let incident = Incident::new(IncidentKind::Medical, (3.0, 4.0), Severity::Low);
        assert_eq!(travel_time_seconds(&ambulance(), &incident), 300.0);

        let slow = ambulance().with_response_time_factor(1.5);
        assert_eq!(travel_time_seconds(&slow, &incident), 450.0);
    }

    #[test]
    fn test_pair_cost_formula() {
        // distance 5 -> 5 minutes, medical weight 2, high severity 3.
        let incident = Incident::new(IncidentKind::Medical, (3.0, 4.0), Severity::High);
        let cost = pair_cost(&ambulance(), &incident);
        assert!((cost - 5.0 * 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_capability_penalty_compounds() {
        let incident = Incident::new(IncidentKind::Medical, (3.0, 4.0), Severity::Low)
            .requires("defibrillator")
            .requires("paramedic")
            .requires("stretcher");
        let resource = ambulance()
            .with_capability("defibrillator")
            .with_capability("paramedic");
        assert!((capability_penalty(&resource, &incident) - 0.64).abs() < 1e-12);
        assert_eq!(capability_penalty(&ambulance(), &incident), 1.0);
    }

    #[test]
    fn test_incompatible_is_infinite() {
        let fire = Incident::new(IncidentKind::Fire, (1.0, 1.0), Severity::Critical);
        assert!(pair_cost(&ambulance(), &fire).is_infinite());
        assert!(explain(&ambulance(), &fire).is_none());
    }

    #[test]
    fn test_explain() {
        let incident = Incident::new(IncidentKind::Medical, (3.0, 4.0), Severity::Low)
            .with_id("inc-1");
        let explained = explain(&ambulance(), &incident).unwrap();
        assert_eq!(explained.resource_id.as_str(), "amb-1");
        assert_eq!(explained.incident_id.as_str(), "inc-1");
        assert_eq!(explained.estimated_response_seconds, 300.0);
        assert_eq!(explained.cost, 10.0);
    }

    #[test]
    fn test_zero_factor_costs_nothing() {
        let incident = Incident::new(IncidentKind::Medical, (30.0, 40.0), Severity::Low);
        let instant = ambulance().with_response_time_factor(0.0);
        assert_eq!(pair_cost(&instant, &incident), 0.0);
    }
}
