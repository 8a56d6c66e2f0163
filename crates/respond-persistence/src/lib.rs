//! File IO for the emergency response engine.
//!
//! This crate reads scenario, venue layout and crowd count files, and
//! writes JSON output using atomic file operations (write to temp file,
//! then rename).
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use respond_persistence::{atomic_write_json, load_layout, load_scenario};
//!
//! let scenario = load_scenario(Path::new("scenario.json")).unwrap();
//! let layout = load_layout(Path::new("venue.json")).unwrap();
//! atomic_write_json(Path::new("out/layout.json"), &layout).unwrap();
//! println!("{} incidents", scenario.incidents.len());
//! ```

pub mod atomic;
pub mod error;
pub mod scenario;

pub use atomic::{atomic_write, atomic_write_json, read_json, read_json_optional};
pub use error::{PersistenceError, Result};
pub use scenario::{load_crowd, load_layout, load_scenario, save_scenario, Scenario};
