//! Audience message templates and the channel policy table.

use std::collections::BTreeMap;

use respond_models::{Audience, Channel, ChannelPolicy, Incident};

/// Message for emergency services.
pub fn emergency_services(incident: &Incident) -> String {
    format!(
        "Emergency at event location {}. Type: {}, Severity: {}. Immediate response required.",
        incident.location, incident.kind, incident.severity
    )
}

/// Message for event staff.
pub fn event_staff(incident: &Incident) -> String {
    format!(
        "Emergency situation detected: {} incident at location {}. \
         Follow emergency protocols. Await further instructions.",
        incident.kind, incident.location
    )
}

/// Message for attendees; severe incidents get a move-to-safety notice.
pub fn attendees(incident: &Incident) -> String {
    if incident.severity.is_severe() {
        "Attention: For your safety, please follow staff instructions and proceed to \
         designated safe areas. Remain calm and orderly."
            .to_string()
    } else {
        "Please be aware of ongoing safety procedures in your area. \
         Follow staff guidance and remain alert."
            .to_string()
    }
}

/// Every audience message for an incident.
pub fn all(incident: &Incident) -> BTreeMap<Audience, String> {
    BTreeMap::from([
        (Audience::EmergencyServices, emergency_services(incident)),
        (Audience::EventStaff, event_staff(incident)),
        (Audience::Attendees, attendees(incident)),
    ])
}

/// Default priority and channel for an audience.
pub fn channel_policy(audience: Audience) -> ChannelPolicy {
    let (priority, channel) = match audience {
        Audience::EmergencyServices => (1, Channel::DirectCall),
        Audience::EventStaff | Audience::SecurityTeam | Audience::MedicalTeam => {
            (2, Channel::Radio)
        }
        Audience::Attendees => (3, Channel::PublicAnnouncement),
        Audience::Media => (4, Channel::PressRelease),
    };
    ChannelPolicy { priority, channel }
}

/// The full channel policy table.
pub fn channel_table() -> BTreeMap<Audience, ChannelPolicy> {
    [
        Audience::EmergencyServices,
        Audience::EventStaff,
        Audience::SecurityTeam,
        Audience::MedicalTeam,
        Audience::Attendees,
        Audience::Media,
    ]
    .into_iter()
    .map(|a| (a, channel_policy(a)))
    .collect()
}
