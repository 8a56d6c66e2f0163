//! Evacuation plan types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::geo::Location;
use crate::ids::{ExitId, ZoneId};

/// Eight-way compass direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    East,
    Northeast,
    North,
    Northwest,
    West,
    Southwest,
    South,
    Southeast,
}

impl Direction {
    /// Buckets an angle (degrees, 0 = east, counter-clockwise) into 45° sectors
    /// centered on each compass point.
    pub fn from_degrees(angle: f64) -> Self {
        if (-22.5..22.5).contains(&angle) {
            Direction::East
        } else if (22.5..67.5).contains(&angle) {
            Direction::Northeast
        } else if (67.5..112.5).contains(&angle) {
            Direction::North
        } else if (112.5..157.5).contains(&angle) {
            Direction::Northwest
        } else if !(-157.5..157.5).contains(&angle) {
            Direction::West
        } else if (-157.5..-112.5).contains(&angle) {
            Direction::Southwest
        } else if (-112.5..-67.5).contains(&angle) {
            Direction::South
        } else {
            Direction::Southeast
        }
    }

    /// Direction of travel from `from` toward `to`.
    pub fn between(from: &Location, to: &Location) -> Self {
        Self::from_degrees(from.bearing_degrees_to(to))
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::East => "East",
            Direction::Northeast => "Northeast",
            Direction::North => "North",
            Direction::Northwest => "Northwest",
            Direction::West => "West",
            Direction::Southwest => "Southwest",
            Direction::South => "South",
            Direction::Southeast => "Southeast",
        };
        f.write_str(s)
    }
}

/// Route from one zone to its assigned exit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvacuationRoute {
    pub zone_id: ZoneId,
    pub exit_id: ExitId,
    pub exit_name: String,
    pub direction: Direction,
    pub distance: f64,
    pub instructions: String,
}

/// People routed through one exit and how long it takes to clear them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitLoad {
    pub exit_id: ExitId,
    pub assigned_people: u64,
    /// People per second.
    pub throughput: f64,
    pub seconds: f64,
}

/// Capacity-constrained evacuation plan for zones near an incident.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EvacuationPlan {
    /// Zones within the danger radius, ascending id.
    pub affected_zones: Vec<ZoneId>,
    /// Every declared exit mapped to the zones routed through it.
    pub exit_assignments: BTreeMap<ExitId, Vec<ZoneId>>,
    /// Affected zones no exit could absorb.
    pub unassigned_zones: Vec<ZoneId>,
    /// Load for each exit with at least one assigned zone.
    pub exit_loads: Vec<ExitLoad>,
    /// Time to clear the slowest exit.
    pub estimated_seconds: f64,
    pub routes: Vec<EvacuationRoute>,
    pub recommendations: Vec<String>,
}

impl EvacuationPlan {
    /// Exit a zone was routed to, if any.
    pub fn exit_for(&self, zone_id: &ZoneId) -> Option<&ExitId> {
        self.exit_assignments
            .iter()
            .find(|(_, zones)| zones.contains(zone_id))
            .map(|(exit_id, _)| exit_id)
    }

    /// Returns true if some affected zone needs manual redirection.
    pub fn has_capacity_gap(&self) -> bool {
        !self.unassigned_zones.is_empty()
    }
}
