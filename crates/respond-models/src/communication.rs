//! Communication plan types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::ids::{IncidentId, ResourceId};

/// Who a notification is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    EmergencyServices,
    EventStaff,
    SecurityTeam,
    MedicalTeam,
    Attendees,
    Media,
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Audience::EmergencyServices => "emergency_services",
            Audience::EventStaff => "event_staff",
            Audience::SecurityTeam => "security_team",
            Audience::MedicalTeam => "medical_team",
            Audience::Attendees => "attendees",
            Audience::Media => "media",
        };
        f.write_str(s)
    }
}

/// Delivery channel. Delivery itself happens outside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    DirectCall,
    Radio,
    PublicAnnouncement,
    PressRelease,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Channel::DirectCall => "direct_call",
            Channel::Radio => "radio",
            Channel::PublicAnnouncement => "public_announcement",
            Channel::PressRelease => "press_release",
        };
        f.write_str(s)
    }
}

/// Default priority and channel for an audience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelPolicy {
    pub priority: u8,
    pub channel: Channel,
}

/// One scheduled notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// Seconds after detection.
    pub offset_seconds: u64,
    /// Detection time plus offset.
    pub scheduled_at: DateTime<Utc>,
    pub audience: Audience,
    pub message: String,
    pub channel: Channel,
    pub priority: u8,
}

/// Kind of contact in the notification list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactKind {
    EmergencyServices,
    Management,
    AssignedResource,
}

/// A party to notify.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub kind: ContactKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<ResourceId>,
    pub priority: u8,
    pub notify_immediately: bool,
}

/// Prioritized, timed notification plan for one incident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunicationPlan {
    pub incident_id: IncidentId,
    pub messages: BTreeMap<Audience, String>,
    /// Ordered by offset.
    pub timeline: Vec<TimelineEntry>,
    /// Ordered by priority.
    pub contacts: Vec<Contact>,
    pub channels: BTreeMap<Audience, ChannelPolicy>,
}

impl CommunicationPlan {
    /// Timeline entries for one audience.
    pub fn entries_for(&self, audience: Audience) -> impl Iterator<Item = &TimelineEntry> {
        self.timeline.iter().filter(move |e| e.audience == audience)
    }
}
