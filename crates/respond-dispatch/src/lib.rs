//! Incident registry and resource pool for the emergency response engine.
//!
//! This crate provides the `DispatchRegistry` for tracking incidents and
//! resources with:
//! - Thread-safe state using `Arc<Mutex<T>>`
//! - Validation at the boundary, with per-item batch reports
//! - Incident status state machine (detected -> confirmed -> responding -> resolved)
//! - Snapshot/solve/commit optimization that never double-assigns a resource
//!
//! # Example
//!
//! ```
//! use respond_dispatch::{DispatchRegistry, ResourceFilter};
//! use respond_models::{Incident, IncidentKind, Resource, ResourceKind, Severity};
//!
//! let registry = DispatchRegistry::default();
//! registry.add_resource(Resource::new(ResourceKind::FireTruck, (0.0, 0.0))).unwrap();
//! registry.add_incident(Incident::new(IncidentKind::Fire, (3.0, 4.0), Severity::Critical)).unwrap();
//!
//! let assignments = registry.optimize_assignments().unwrap();
//! assert_eq!(assignments.len(), 1);
//!
//! let idle = registry.list_resources(Some(ResourceFilter::new().with_available(true)));
//! assert!(idle.is_empty());
//! ```

pub mod error;
pub mod filter;
pub mod ingest;
pub mod registry;

pub use error::{DispatchError, Result};
pub use filter::{IncidentFilter, ResourceFilter};
pub use ingest::{IngestReport, Rejected};
pub use registry::{DispatchRegistry, Snapshot};
