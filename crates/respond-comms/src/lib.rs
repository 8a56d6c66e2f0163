//! Notification planning for the emergency response engine.
//!
//! `CommunicationScheduler` turns an incident and the current assignment
//! into a `CommunicationPlan`:
//! - Audience messages (emergency services, event staff, attendees)
//! - A timeline offset from the detection time (direct call, staff radio,
//!   public announcement for severe incidents)
//! - A contact list including every resource committed to the incident
//! - The channel policy table
//!
//! Building a plan is a pure function; delivering it is up to the caller.

pub mod messages;
pub mod scheduler;

pub use scheduler::{CommunicationScheduler, SchedulerConfig};
