//! Scenario, venue layout and crowd count files.
//!
//! A scenario file holds the raw incident and resource payloads:
//!
//! ```text
//! {
//!   "incidents": [ { "id": "inc-1", "type": "medical", ... } ],
//!   "resources": [ { "id": "amb-1", "type": "ambulance", ... } ],
//!   "layout": { "exits": [...], "zones": [...] },   // optional
//!   "crowd": { "Z1": 400 }                          // optional
//! }
//! ```
//!
//! Incidents and resources stay as raw JSON so the registry can accept or
//! reject each one on its own.

use std::path::Path;

use respond_models::{CrowdDistribution, VenueLayout};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::atomic::{atomic_write_json, read_json};
use crate::error::{PersistenceError, Result};

/// Contents of a scenario file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub incidents: Vec<serde_json::Value>,
    #[serde(default)]
    pub resources: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<VenueLayout>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crowd: Option<CrowdDistribution>,
}

/// Loads a scenario file. An embedded layout is validated.
pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let scenario: Scenario = read_json(path, "scenario")?;
    if let Some(layout) = &scenario.layout {
        check_layout(path, layout)?;
    }
    debug!(
        path = %path.display(),
        incidents = scenario.incidents.len(),
        resources = scenario.resources.len(),
        "scenario loaded"
    );
    Ok(scenario)
}

/// Writes a scenario file atomically.
pub fn save_scenario(path: &Path, scenario: &Scenario) -> Result<()> {
    atomic_write_json(path, scenario)
}

/// Loads and validates a venue layout file.
pub fn load_layout(path: &Path) -> Result<VenueLayout> {
    let layout: VenueLayout = read_json(path, "layout")?;
    check_layout(path, &layout)?;
    debug!(
        path = %path.display(),
        exits = layout.exits.len(),
        zones = layout.zones.len(),
        "layout loaded"
    );
    Ok(layout)
}

/// Loads a crowd count file (`{ "zone id": count }`).
///
/// Negative or fractional counts are rejected by the parser.
pub fn load_crowd(path: &Path) -> Result<CrowdDistribution> {
    read_json(path, "crowd")
}

fn check_layout(path: &Path, layout: &VenueLayout) -> Result<()> {
    layout
        .validate()
        .map_err(|e| PersistenceError::InvalidData {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}
