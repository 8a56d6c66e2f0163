//! Evacuation planning for the emergency response engine.
//!
//! Given a venue layout, an incident location and live crowd counts, the
//! `EvacuationPlanner` picks the zones inside the danger radius and routes
//! each one, whole, to the nearest exit that still has capacity for it.
//! Zones that fit nowhere are reported rather than dropped.
//!
//! # Example
//!
//! ```
//! use respond_evacuation::EvacuationPlanner;
//! use respond_models::{CrowdDistribution, Exit, Location, VenueLayout, Zone, ZoneId};
//!
//! let layout = VenueLayout::new(
//!     vec![Exit::new("E1", "Main Gate", (0.0, 0.0), 500)],
//!     vec![Zone::new("Z1", (110.0, 105.0), 1000)],
//! );
//! let mut crowd = CrowdDistribution::new();
//! crowd.insert(ZoneId::from("Z1"), 400);
//!
//! let plan = EvacuationPlanner::default().plan_evacuation(&layout, Location::new(100.0, 100.0), &crowd);
//! assert_eq!(plan.estimated_seconds, 200.0);
//! ```

pub mod planner;

pub use planner::{EvacuationConfig, EvacuationPlanner};
