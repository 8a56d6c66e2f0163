//! Emergency response engine.
//!
//! This crate ties the components together behind `ResponseEngine`:
//! - `respond-dispatch` for the incident registry and assignment commits
//! - `respond-evacuation` for zone-to-exit evacuation plans
//! - `respond-comms` for notification timelines and contact lists
//! - `EngineConfig` layered from defaults, a JSON file and the environment
//! - `EngineNotice` pub/sub for an external transport to forward
//!
//! # Example
//!
//! ```no_run
//! use respond_engine::ResponseEngine;
//! use respond_persistence::load_scenario;
//! use std::path::Path;
//!
//! let engine = ResponseEngine::from_config_file(None).unwrap();
//! let scenario = load_scenario(Path::new("scenario.json")).unwrap();
//! let report = engine.ingest_json(&scenario);
//! assert!(report.is_clean());
//!
//! engine.optimize_assignments().unwrap();
//! for detail in engine.assignment_details() {
//!     println!("{} -> {}", detail.resource_id, detail.incident_id);
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod notice;

pub use config::{default_config_path, EngineConfig};
pub use engine::{ResponseEngine, ScenarioReport};
pub use error::{EngineError, Result};
pub use notice::EngineNotice;
