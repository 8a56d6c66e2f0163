//! EvacuationPlanner - greedy zone-to-exit routing under exit capacity.

use std::collections::BTreeMap;

use respond_models::{
    CrowdDistribution, Direction, EvacuationPlan, EvacuationRoute, Exit, ExitId, ExitLoad,
    Location, VenueLayout, Zone, ZoneId,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Affected zone count above which phased evacuation is recommended.
const PHASED_EVACUATION_THRESHOLD: usize = 3;

const BASE_RECOMMENDATIONS: [&str; 3] = [
    "Activate emergency announcement system",
    "Deploy personnel to guide evacuation",
    "Ensure emergency exits are clear and accessible",
];

const TRAILING_RECOMMENDATIONS: [&str; 2] = [
    "Monitor crowd flow and adjust routes as needed",
    "Coordinate with external emergency services",
];

/// Configuration for evacuation planning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvacuationConfig {
    /// Zones whose center lies within this distance of the incident are affected.
    pub danger_radius: f64,
    /// Exit capacity is divided by this to get people per second.
    pub throughput_divisor: f64,
    /// Hard cap on people per second through any exit.
    pub max_throughput: f64,
}

impl Default for EvacuationConfig {
    fn default() -> Self {
        Self {
            danger_radius: 50.0,
            throughput_divisor: 50.0,
            max_throughput: 2.0,
        }
    }
}

impl EvacuationConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the danger radius.
    pub fn with_danger_radius(mut self, radius: f64) -> Self {
        self.danger_radius = radius;
        self
    }

    /// Sets the capacity divisor used for throughput.
    pub fn with_throughput_divisor(mut self, divisor: f64) -> Self {
        self.throughput_divisor = divisor;
        self
    }

    /// Sets the throughput cap.
    pub fn with_max_throughput(mut self, max: f64) -> Self {
        self.max_throughput = max;
        self
    }

    /// People per second through an exit of the given capacity.
    pub fn throughput(&self, capacity: u32) -> f64 {
        (capacity as f64 / self.throughput_divisor).min(self.max_throughput)
    }
}

/// Stateless evacuation planner.
#[derive(Debug, Clone, Default)]
pub struct EvacuationPlanner {
    config: EvacuationConfig,
}

impl EvacuationPlanner {
    /// Creates a planner with the given config.
    pub fn new(config: EvacuationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EvacuationConfig {
        &self.config
    }

    /// Zones within the danger radius of `incident_location`, ascending id.
    pub fn affected_zones<'a>(
        &self,
        layout: &'a VenueLayout,
        incident_location: Location,
    ) -> Vec<&'a Zone> {
        let mut zones: Vec<&Zone> = layout
            .zones
            .iter()
            .filter(|z| z.center.distance_to(&incident_location) <= self.config.danger_radius)
            .collect();
        zones.sort_by(|a, b| a.id.cmp(&b.id));
        zones
    }

    /// Builds an evacuation plan for the zones near an incident.
    ///
    /// Each affected zone with a known crowd count goes whole to the nearest
    /// exit that still has room for it. Zones no exit can absorb are listed
    /// in `unassigned_zones`; zones missing from `crowd` are skipped.
    pub fn plan_evacuation(
        &self,
        layout: &VenueLayout,
        incident_location: Location,
        crowd: &CrowdDistribution,
    ) -> EvacuationPlan {
        let affected = self.affected_zones(layout, incident_location);

        let mut remaining: Vec<u64> = layout.exits.iter().map(|e| e.capacity as u64).collect();
        let mut assigned_people: Vec<u64> = vec![0; layout.exits.len()];
        let mut exit_assignments: BTreeMap<ExitId, Vec<ZoneId>> = layout
            .exits
            .iter()
            .map(|e| (e.id.clone(), Vec::new()))
            .collect();
        let mut unassigned_zones = Vec::new();
        let mut routes = Vec::new();

        for zone in &affected {
            let Some(&count) = crowd.get(&zone.id) else {
                debug!(zone_id = %zone.id, "no crowd count, skipping zone");
                continue;
            };
            let count = count as u64;

            match nearest_exit_with_room(&layout.exits, &remaining, zone, count) {
                Some(index) => {
                    let exit = &layout.exits[index];
                    remaining[index] -= count;
                    assigned_people[index] += count;
                    if let Some(zones) = exit_assignments.get_mut(&exit.id) {
                        zones.push(zone.id.clone());
                    }
                    routes.push(route(zone, exit));
                }
                None => {
                    warn!(zone_id = %zone.id, people = count, "no exit can absorb zone");
                    unassigned_zones.push(zone.id.clone());
                }
            }
        }

        let exit_loads: Vec<ExitLoad> = layout
            .exits
            .iter()
            .zip(&assigned_people)
            .filter(|(exit, _)| {
                exit_assignments
                    .get(&exit.id)
                    .map(|zones| !zones.is_empty())
                    .unwrap_or(false)
            })
            .map(|(exit, &people)| self.exit_load(exit, people))
            .collect();

        let estimated_seconds = exit_loads.iter().map(|l| l.seconds).fold(0.0, f64::max);

        let affected_zones: Vec<ZoneId> = affected.iter().map(|z| z.id.clone()).collect();
        let recommendations = recommendations(affected_zones.len(), &unassigned_zones);

        info!(
            affected = affected_zones.len(),
            routed = routes.len(),
            unassigned = unassigned_zones.len(),
            estimated_seconds,
            "evacuation plan built"
        );

        EvacuationPlan {
            affected_zones,
            exit_assignments,
            unassigned_zones,
            exit_loads,
            estimated_seconds,
            routes,
            recommendations,
        }
    }

    fn exit_load(&self, exit: &Exit, people: u64) -> ExitLoad {
        let throughput = self.config.throughput(exit.capacity);
        let seconds = if throughput > 0.0 {
            people as f64 / throughput
        } else {
            f64::INFINITY
        };
        ExitLoad {
            exit_id: exit.id.clone(),
            assigned_people: people,
            throughput,
            seconds,
        }
    }
}

/// Index of the closest exit with room for `count` people.
///
/// Ties go to the exit declared first; zero-capacity exits never qualify.
fn nearest_exit_with_room(
    exits: &[Exit],
    remaining: &[u64],
    zone: &Zone,
    count: u64,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, exit) in exits.iter().enumerate() {
        if exit.capacity == 0 || remaining[index] < count {
            continue;
        }
        let distance = zone.center.distance_to(&exit.location);
        if best.map(|(_, d)| distance < d).unwrap_or(true) {
            best = Some((index, distance));
        }
    }
    best.map(|(index, _)| index)
}

fn route(zone: &Zone, exit: &Exit) -> EvacuationRoute {
    let exit_name = exit.display_name();
    EvacuationRoute {
        zone_id: zone.id.clone(),
        exit_id: exit.id.clone(),
        direction: Direction::between(&zone.center, &exit.location),
        distance: zone.center.distance_to(&exit.location),
        instructions: format!("Proceed to {exit_name} via the shortest safe route"),
        exit_name,
    }
}

fn recommendations(affected: usize, unassigned: &[ZoneId]) -> Vec<String> {
    let mut out: Vec<String> = BASE_RECOMMENDATIONS.iter().map(|s| s.to_string()).collect();

    if affected > PHASED_EVACUATION_THRESHOLD {
        out.push("Consider phased evacuation to prevent overcrowding".to_string());
    }

    out.extend(TRAILING_RECOMMENDATIONS.iter().map(|s| s.to_string()));

    if !unassigned.is_empty() {
        let zones: Vec<&str> = unassigned.iter().map(|z| z.as_str()).collect();
        out.push(format!(
            "Manually redirect zones with no exit capacity: {}",
            zones.join(", ")
        ));
    }

    out
}
