//! Venue layout: exits, zones and live crowd counts.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::error::{Result, ValidationError};
use crate::geo::Location;
use crate::ids::{ExitId, ZoneId};

/// Live occupant count per zone.
pub type CrowdDistribution = HashMap<ZoneId, u32>;

/// An egress point with a maximum people-per-event capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Exit {
    pub id: ExitId,

    /// Human-readable name used in route instructions.
    #[serde(default)]
    pub name: String,

    pub location: Location,

    /// Maximum number of people routed through this exit.
    pub capacity: u32,
}

impl Exit {
    /// Creates an exit.
    pub fn new(
        id: impl Into<ExitId>,
        name: impl Into<String>,
        location: impl Into<Location>,
        capacity: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            location: location.into(),
            capacity,
        }
    }

    /// Name for instructions, falling back to "Exit {id}".
    pub fn display_name(&self) -> String {
        if self.name.trim().is_empty() {
            format!("Exit {}", self.id)
        } else {
            self.name.clone()
        }
    }
}

/// A spatial subdivision of the venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Zone {
    pub id: ZoneId,
    pub center: Location,
    #[serde(default)]
    pub capacity: u32,
}

impl Zone {
    /// Creates a zone.
    pub fn new(id: impl Into<ZoneId>, center: impl Into<Location>, capacity: u32) -> Self {
        Self {
            id: id.into(),
            center: center.into(),
            capacity,
        }
    }
}

/// Static venue configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VenueLayout {
    #[serde(default)]
    pub exits: Vec<Exit>,
    #[serde(default)]
    pub zones: Vec<Zone>,
}

impl VenueLayout {
    /// Creates a layout from exits and zones.
    pub fn new(exits: Vec<Exit>, zones: Vec<Zone>) -> Self {
        Self { exits, zones }
    }

    /// Looks up a zone by id.
    pub fn zone(&self, id: &ZoneId) -> Option<&Zone> {
        self.zones.iter().find(|z| &z.id == id)
    }

    /// Looks up an exit by id.
    pub fn exit(&self, id: &ExitId) -> Option<&Exit> {
        self.exits.iter().find(|e| &e.id == id)
    }

    /// Rejects blank or duplicate ids and non-finite coordinates.
    pub fn validate(&self) -> Result<()> {
        let mut exit_ids = HashSet::new();
        for exit in &self.exits {
            if exit.id.is_blank() {
                return Err(ValidationError::EmptyId { entity: "exit" });
            }
            if !exit.location.is_finite() {
                return Err(ValidationError::NonFiniteLocation {
                    entity: "exit",
                    id: exit.id.to_string(),
                });
            }
            if !exit_ids.insert(&exit.id) {
                return Err(ValidationError::DuplicateId {
                    entity: "exit",
                    id: exit.id.to_string(),
                });
            }
        }

        let mut zone_ids = HashSet::new();
        for zone in &self.zones {
            if zone.id.is_blank() {
                return Err(ValidationError::EmptyId { entity: "zone" });
            }
            if !zone.center.is_finite() {
                return Err(ValidationError::NonFiniteLocation {
                    entity: "zone",
                    id: zone.id.to_string(),
                });
            }
            if !zone_ids.insert(&zone.id) {
                return Err(ValidationError::DuplicateId {
                    entity: "zone",
                    id: zone.id.to_string(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_display_name_fallback() {
        let named = Exit::new("e1", "North Gate", (0.0, 0.0), 100);
        let unnamed = Exit::new("e2", "", (0.0, 0.0), 100);
        assert_eq!(named.display_name(), "North Gate");
        assert_eq!(unnamed.display_name(), "Exit e2");
    }

    #[test]
    fn test_lookup() {
        let layout = VenueLayout::new(
            vec![Exit::new("e1", "Main", (0.0, 0.0), 500)],
            vec![Zone::new("z1", (10.0, 10.0), 1000)],
        );
        assert!(layout.zone(&ZoneId::from("z1")).is_some());
        assert!(layout.exit(&ExitId::from("e1")).is_some());
        assert!(layout.zone(&ZoneId::from("z9")).is_none());
    }

    #[test]
    fn test_validate_duplicate_zone() {
        let layout = VenueLayout::new(
            vec![],
            vec![
                Zone::new("z1", (0.0, 0.0), 10),
                Zone::new("z1", (5.0, 5.0), 10),
            ],
        );
        assert!(matches!(
            layout.validate(),
            Err(ValidationError::DuplicateId { entity: "zone", .. })
        ));
    }

    #[test]
    fn test_deserialize_layout() {
        let json = r#"{
            "exits": [{"id": "E1", "name": "Gate A", "location": {"x": 0, "y": 0}, "capacity": 500}],
            "zones": [{"id": "Z1", "center": {"x": 110, "y": 105}}]
        }"#;
        let layout: VenueLayout = serde_json::from_str(json).unwrap();
        assert_eq!(layout.exits.len(), 1);
        assert_eq!(layout.zones[0].capacity, 0);
        assert!(layout.validate().is_ok());
    }
}
