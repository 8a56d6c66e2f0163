//! AssignmentOptimizer - min-cost bipartite matching of resources to incidents.

use respond_models::{Assignment, AssignmentMap, Incident, Resource};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cost;
use crate::hungarian;

/// Configuration for the optimizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Soft bound on either matrix dimension. Larger problems are solved but logged.
    pub max_matrix_dim: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_matrix_dim: 500,
        }
    }
}

impl OptimizerConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the soft matrix bound.
    pub fn with_max_matrix_dim(mut self, dim: usize) -> Self {
        self.max_matrix_dim = dim;
        self
    }
}

/// Stateless assignment solver.
///
/// Infeasible cells are replaced by a penalty larger than the sum of every
/// finite cell, so the solver first maximizes the number of feasible pairs
/// and then minimizes their total cost. Penalized pairs are dropped from the
/// result.
#[derive(Debug, Clone, Default)]
pub struct AssignmentOptimizer {
    config: OptimizerConfig,
}

impl AssignmentOptimizer {
    /// Creates an optimizer with the given config.
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Builds the |resources| x |incidents| cost matrix (infeasible = +inf).
    pub fn cost_matrix(&self, resources: &[Resource], incidents: &[Incident]) -> Vec<Vec<f64>> {
        resources
            .iter()
            .map(|r| incidents.iter().map(|i| cost::pair_cost(r, i)).collect())
            .collect()
    }

    /// Cost breakdown for one pair, or `None` if infeasible.
    pub fn explain(&self, resource: &Resource, incident: &Incident) -> Option<Assignment> {
        cost::explain(resource, incident)
    }

    /// Solves the assignment problem and returns the feasible pairs.
    ///
    /// Unavailable resources and retired incidents are ignored. The result is
    /// injective in both directions and ordered by resource id.
    pub fn solve(&self, resources: &[Resource], incidents: &[Incident]) -> Vec<Assignment> {
        let resources: Vec<&Resource> = resources.iter().filter(|r| r.available).collect();
        let incidents: Vec<&Incident> = incidents.iter().filter(|i| i.is_active()).collect();

        if resources.is_empty() || incidents.is_empty() {
            return Vec::new();
        }

        if resources.len() > self.config.max_matrix_dim
            || incidents.len() > self.config.max_matrix_dim
        {
            warn!(
                resources = resources.len(),
                incidents = incidents.len(),
                bound = self.config.max_matrix_dim,
                "assignment matrix exceeds soft bound"
            );
        }

        let raw: Vec<Vec<f64>> = resources
            .iter()
            .map(|r| incidents.iter().map(|i| cost::pair_cost(r, i)).collect())
            .collect();

        if raw.iter().flatten().all(|c| !c.is_finite()) {
            debug!("no feasible resource/incident pairs");
            return Vec::new();
        }
        let solvable = penalized(&raw);

        let mut assignments: Vec<Assignment> = hungarian::solve(&solvable)
            .into_iter()
            .filter(|&(r, i)| raw[r][i].is_finite())
            .map(|(r, i)| Assignment {
                resource_id: resources[r].id.clone(),
                incident_id: incidents[i].id.clone(),
                cost: raw[r][i],
                estimated_response_seconds: cost::travel_time_seconds(resources[r], incidents[i]),
            })
            .collect();
        assignments.sort_by(|a, b| a.resource_id.cmp(&b.resource_id));

        debug!(
            resources = resources.len(),
            incidents = incidents.len(),
            matched = assignments.len(),
            total_cost = total_cost(&assignments),
            "solved assignment problem"
        );

        assignments
    }

    /// Solves and returns only the resource -> incident mapping.
    pub fn optimize(&self, resources: &[Resource], incidents: &[Incident]) -> AssignmentMap {
        self.solve(resources, incidents)
            .into_iter()
            .map(|a| (a.resource_id, a.incident_id))
            .collect()
    }
}

/// Sum of pair costs.
pub fn total_cost(assignments: &[Assignment]) -> f64 {
    assignments.iter().map(|a| a.cost).sum()
}

/// Rescales finite costs into `[0, 1]` and replaces infeasible cells with a
/// penalty above any matching's finite total.
///
/// A matching has at most `min(rows, cols)` pairs, so after scaling its
/// finite cost is at most that count and `count + 1` always dominates.
/// Scaling keeps the solver's potentials bounded for extreme coordinates.
fn penalized(raw: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let max_finite = raw
        .iter()
        .flatten()
        .copied()
        .filter(|c| c.is_finite())
        .fold(0.0_f64, f64::max);
    let scale = if max_finite > 0.0 { max_finite } else { 1.0 };
    let pairs = raw.len().min(raw.first().map_or(0, Vec::len));
    let penalty = pairs as f64 + 1.0;

    raw.iter()
        .map(|row| {
            row.iter()
                .map(|&c| if c.is_finite() { c / scale } else { penalty })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use respond_models::{IncidentKind, IncidentStatus, ResourceId, ResourceKind, Severity};
    use std::collections::HashSet;

    fn resource(id: &str, kind: ResourceKind, at: (f64, f64)) -> Resource {
        Resource::new(kind, at).with_id(id)
    }

    fn incident(id: &str, kind: IncidentKind, at: (f64, f64), severity: Severity) -> Incident {
        Incident::new(kind, at, severity).with_id(id)
    }

    #[test]
    fn test_reference_scenario() {
        let resources = vec![
            resource("ambulance", ResourceKind::Ambulance, (100.0, 200.0)).with_capability("medical"),
            resource("fire-truck", ResourceKind::FireTruck, (300.0, 250.0)).with_capability("fire"),
        ];
        let incidents = vec![
            incident("medical", IncidentKind::Medical, (110.0, 205.0), Severity::High),
            incident("fire", IncidentKind::Fire, (290.0, 240.0), Severity::Critical),
        ];

        let map = AssignmentOptimizer::default().optimize(&resources, &incidents);

        assert_eq!(map.len(), 2);
        assert_eq!(map[&ResourceId::from("ambulance")].as_str(), "medical");
        assert_eq!(map[&ResourceId::from("fire-truck")].as_str(), "fire");
    }

    #[test]
    fn test_empty_inputs() {
        let optimizer = AssignmentOptimizer::default();
        let resources = vec![resource("a", ResourceKind::Ambulance, (0.0, 0.0))];
        let incidents = vec![incident("i", IncidentKind::Medical, (0.0, 0.0), Severity::Low)];

        assert!(optimizer.optimize(&[], &incidents).is_empty());
        assert!(optimizer.optimize(&resources, &[]).is_empty());
    }

    #[test]
    fn test_extreme_coordinates_terminate() {
        // Finite pair costs whose sum exceeds f64::MAX.
        let mut resources: Vec<Resource> = (0..8)
            .map(|k| resource(&format!("police-{k}"), ResourceKind::PoliceCar, (0.0, k as f64)))
            .collect();
        resources.push(resource("amb", ResourceKind::Ambulance, (0.0, 0.0)));
        let incidents: Vec<Incident> = (0..10)
            .map(|k| {
                incident(&format!("sec-{k}"), IncidentKind::Security, (1e306, k as f64), Severity::Low)
            })
            .collect();
        for i in &incidents {
            assert!(i.validate().is_ok());
        }

        let solved = AssignmentOptimizer::default().solve(&resources, &incidents);

        assert_eq!(solved.len(), 8);
        let incident_ids: HashSet<_> = solved.iter().map(|a| &a.incident_id).collect();
        assert_eq!(incident_ids.len(), 8);
        assert!(solved.iter().all(|a| a.resource_id.as_str().starts_with("police-")));
    }

    #[test]
    fn test_penalized_matrix_stays_finite() {
        let raw = vec![
            vec![f64::MAX, f64::INFINITY, f64::MAX],
            vec![f64::MAX / 2.0, f64::MAX, f64::INFINITY],
        ];
        let solvable = penalized(&raw);

        assert!(solvable.iter().flatten().all(|c| c.is_finite()));
        assert_eq!(solvable[0][0], 1.0);
        assert_eq!(solvable[1][0], 0.5);
        assert_eq!(solvable[0][1], 3.0);
        assert_eq!(solvable[1][2], 3.0);
    }

    #[test]
    fn test_all_infeasible() {
        let resources = vec![
            resource("a", ResourceKind::Ambulance, (0.0, 0.0)),
            resource("b", ResourceKind::MedicalPersonnel, (1.0, 0.0)),
        ];
        let incidents = vec![incident("f", IncidentKind::Fire, (0.0, 0.0), Severity::Critical)];

        assert!(AssignmentOptimizer::default()
            .optimize(&resources, &incidents)
            .is_empty());
    }

    #[test]
    fn test_infeasible_pair_never_emitted_to_complete_matching() {
        // Two medical incidents but only one ambulance; the police car must not
        // be forced onto the medical incident.
        let resources = vec![
            resource("amb", ResourceKind::Ambulance, (0.0, 0.0)),
            resource("police", ResourceKind::PoliceCar, (0.0, 0.0)),
        ];
        let incidents = vec![
            incident("med-1", IncidentKind::Medical, (1.0, 0.0), Severity::Low),
            incident("med-2", IncidentKind::Medical, (2.0, 0.0), Severity::Low),
        ];

        let assignments = AssignmentOptimizer::default().solve(&resources, &incidents);
        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].resource_id.as_str(), "amb");
        assert_eq!(assignments[0].incident_id.as_str(), "med-1");
    }

    #[test]
    fn test_covers_every_incident_when_possible() {
        // The crew is far from both fires but still takes one of them.
        let resources = vec![
            resource("truck", ResourceKind::FireTruck, (0.0, 0.0)),
            resource("crew", ResourceKind::FirePersonnel, (100.0, 0.0)),
        ];
        let incidents = vec![
            incident("fire-a", IncidentKind::Fire, (1.0, 0.0), Severity::Low),
            incident("fire-b", IncidentKind::Fire, (2.0, 0.0), Severity::Low),
        ];

        let assignments = AssignmentOptimizer::default().solve(&resources, &incidents);
        assert_eq!(assignments.len(), 2);
    }

    #[test]
    fn test_skips_unavailable_and_retired() {
        let mut busy = resource("busy", ResourceKind::Ambulance, (0.0, 0.0));
        busy.available = false;
        let free = resource("free", ResourceKind::Ambulance, (50.0, 0.0));

        let mut resolved = incident("old", IncidentKind::Medical, (0.0, 0.0), Severity::High);
        resolved.status = IncidentStatus::Resolved;
        let open = incident("new", IncidentKind::Medical, (40.0, 0.0), Severity::High);

        let map = AssignmentOptimizer::default().optimize(&[busy, free], &[resolved, open]);
        assert_eq!(map.len(), 1);
        assert_eq!(map[&ResourceId::from("free")].as_str(), "new");
    }

    #[test]
    fn test_more_resources_than_incidents() {
        let resources = vec![
            resource("far", ResourceKind::Ambulance, (500.0, 500.0)),
            resource("near", ResourceKind::Ambulance, (1.0, 1.0)),
            resource("mid", ResourceKind::MedicalPersonnel, (50.0, 50.0)),
        ];
        let incidents = vec![incident("m", IncidentKind::Medical, (0.0, 0.0), Severity::Medium)];

        let map = AssignmentOptimizer::default().optimize(&resources, &incidents);
        assert_eq!(map.len(), 1);
        assert!(map.contains_key(&ResourceId::from("near")));
    }

    #[test]
    fn test_repeat_solve_same_total_cost() {
        let resources = vec![
            resource("a", ResourceKind::Ambulance, (0.0, 0.0)),
            resource("b", ResourceKind::Ambulance, (10.0, 0.0)),
        ];
        let incidents = vec![
            incident("x", IncidentKind::Medical, (5.0, 0.0), Severity::Low),
            incident("y", IncidentKind::Medical, (5.0, 0.0), Severity::Low),
        ];
        let optimizer = AssignmentOptimizer::default();
        let first = total_cost(&optimizer.solve(&resources, &incidents));
        let second = total_cost(&optimizer.solve(&resources, &incidents));
        assert_eq!(first, second);
    }

    // ── brute-force optimality ───────────────────────────────────────────

    /// Small deterministic generator so the property test needs no extra crates.
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self) -> u64 {
            self.0 = self
                .0
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            self.0 >> 33
        }

        fn coord(&mut self) -> f64 {
            (self.next() % 200) as f64
        }

        fn pick<T: Copy>(&mut self, items: &[T]) -> T {
            items[(self.next() as usize) % items.len()]
        }
    }

    /// Best (cardinality, cost) over every feasible partial matching.
    fn brute_force(matrix: &[Vec<f64>]) -> (usize, f64) {
        fn walk(
            matrix: &[Vec<f64>],
            row: usize,
            used: &mut [bool],
            size: usize,
            cost: f64,
            best: &mut (usize, f64),
        ) {
            if row == matrix.len() {
                if size > best.0 || (size == best.0 && cost < best.1) {
                    *best = (size, cost);
                }
                return;
            }
            walk(matrix, row + 1, used, size, cost, best);
            for col in 0..used.len() {
                if !used[col] && matrix[row][col].is_finite() {
                    used[col] = true;
                    walk(matrix, row + 1, used, size + 1, cost + matrix[row][col], best);
                    used[col] = false;
                }
            }
        }

        let cols = matrix.first().map_or(0, Vec::len);
        let mut best = (0, 0.0);
        walk(matrix, 0, &mut vec![false; cols], 0, 0.0, &mut best);
        best
    }

    #[test]
    fn test_optimal_against_brute_force() {
        let resource_kinds = [
            ResourceKind::Ambulance,
            ResourceKind::MedicalPersonnel,
            ResourceKind::FireTruck,
            ResourceKind::FirePersonnel,
            ResourceKind::PoliceCar,
            ResourceKind::SecurityPersonnel,
        ];
        let incident_kinds = [IncidentKind::Medical, IncidentKind::Fire, IncidentKind::Security];
        let severities = [Severity::Low, Severity::Medium, Severity::High, Severity::Critical];
        let optimizer = AssignmentOptimizer::default();
        let mut rng = Lcg(42);

        for round in 0..200 {
            let n_resources = 1 + (rng.next() % 6) as usize;
            let n_incidents = 1 + (rng.next() % 6) as usize;

            let resources: Vec<Resource> = (0..n_resources)
                .map(|k| {
                    resource(&format!("r{k}"), rng.pick(&resource_kinds), (rng.coord(), rng.coord()))
                        .with_response_time_factor(0.5 + (rng.next() % 3) as f64 * 0.5)
                })
                .collect();
            let incidents: Vec<Incident> = (0..n_incidents)
                .map(|k| {
                    incident(
                        &format!("i{k}"),
                        rng.pick(&incident_kinds),
                        (rng.coord(), rng.coord()),
                        rng.pick(&severities),
                    )
                })
                .collect();

            let matrix = optimizer.cost_matrix(&resources, &incidents);
            let (best_size, best_cost) = brute_force(&matrix);
            let solved = optimizer.solve(&resources, &incidents);

            let resource_ids: HashSet<_> = solved.iter().map(|a| &a.resource_id).collect();
            let incident_ids: HashSet<_> = solved.iter().map(|a| &a.incident_id).collect();
            assert_eq!(resource_ids.len(), solved.len(), "round {round}: resource reused");
            assert_eq!(incident_ids.len(), solved.len(), "round {round}: incident reused");

            for a in &solved {
                let r = resources.iter().find(|r| r.id == a.resource_id).unwrap();
                let i = incidents.iter().find(|i| i.id == a.incident_id).unwrap();
                assert!(r.kind.can_serve(i.kind), "round {round}: incompatible pair");
            }

            assert_eq!(solved.len(), best_size, "round {round}: not maximum cardinality");
            let cost = total_cost(&solved);
            assert!(
                cost <= best_cost + 1e-6 * (1.0 + best_cost),
                "round {round}: cost {cost} > brute force {best_cost}"
            );
        }
    }
}
