//! Min-cost assignment of response resources to incidents.
//!
//! This crate provides the `AssignmentOptimizer`, a stateless solver that:
//! - Builds a resource x incident cost matrix from travel time, incident
//!   urgency, capability match and severity
//! - Marks incompatible pairs as infeasible (infinite cost)
//! - Solves the matching with the Hungarian algorithm and drops any
//!   infeasible pair from the result
//!
//! Committing the result (flipping resource availability) is the registry's
//! job; see `respond-dispatch`.
//!
//! # Example
//!
//! ```
//! use respond_models::{Incident, IncidentKind, Resource, ResourceKind, Severity};
//! use respond_optimizer::AssignmentOptimizer;
//!
//! let resources = vec![Resource::new(ResourceKind::Ambulance, (100.0, 200.0)).with_id("amb-1")];
//! let incidents = vec![Incident::new(IncidentKind::Medical, (110.0, 205.0), Severity::High)];
//!
//! let map = AssignmentOptimizer::default().optimize(&resources, &incidents);
//! assert_eq!(map.len(), 1);
//! ```

pub mod cost;
pub mod hungarian;
pub mod optimizer;

pub use optimizer::{total_cost, AssignmentOptimizer, OptimizerConfig};
