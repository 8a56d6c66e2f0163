//! CommunicationScheduler - builds the notification plan for one incident.

use chrono::{DateTime, TimeDelta, Utc};
use respond_models::{
    AssignmentMap, Audience, CommunicationPlan, Contact, ContactKind, Incident, TimelineEntry,
};
use serde::{Deserialize, Serialize};

use crate::messages;

/// Configuration for notification scheduling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Number dialed for the emergency services contact.
    pub emergency_phone: String,
    /// Delay before event staff are radioed.
    pub staff_delay_secs: u64,
    /// Delay before the public announcement on severe incidents.
    pub public_delay_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            emergency_phone: "911".to_string(),
            staff_delay_secs: 30,
            public_delay_secs: 120,
        }
    }
}

impl SchedulerConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the emergency services phone number.
    pub fn with_emergency_phone(mut self, phone: impl Into<String>) -> Self {
        self.emergency_phone = phone.into();
        self
    }

    /// Sets the staff radio delay.
    pub fn with_staff_delay_secs(mut self, secs: u64) -> Self {
        self.staff_delay_secs = secs;
        self
    }

    /// Sets the public announcement delay.
    pub fn with_public_delay_secs(mut self, secs: u64) -> Self {
        self.public_delay_secs = secs;
        self
    }
}

/// Pure notification planner: no I/O and no clock reads.
#[derive(Debug, Clone, Default)]
pub struct CommunicationScheduler {
    config: SchedulerConfig,
}

impl CommunicationScheduler {
    /// Creates a scheduler with the given config.
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Builds messages, timeline, contacts and channel table for an incident.
    ///
    /// Only resources whose assignment points at this incident are listed
    /// as contacts.
    pub fn build_communication_plan(
        &self,
        incident: &Incident,
        assignments: &AssignmentMap,
    ) -> CommunicationPlan {
        let messages = messages::all(incident);
        let timeline = self.timeline(incident, &messages);
        let contacts = self.contacts(incident, assignments);

        CommunicationPlan {
            incident_id: incident.id.clone(),
            messages,
            timeline,
            contacts,
            channels: messages::channel_table(),
        }
    }

    fn timeline(
        &self,
        incident: &Incident,
        messages: &std::collections::BTreeMap<Audience, String>,
    ) -> Vec<TimelineEntry> {
        let mut steps = vec![
            (0, Audience::EmergencyServices),
            (self.config.staff_delay_secs, Audience::EventStaff),
        ];
        if incident.severity.is_severe() {
            steps.push((self.config.public_delay_secs, Audience::Attendees));
        }

        let mut timeline: Vec<TimelineEntry> = steps
            .into_iter()
            .map(|(offset, audience)| {
                let policy = messages::channel_policy(audience);
                TimelineEntry {
                    offset_seconds: offset,
                    scheduled_at: offset_from(incident.detected_at, offset),
                    audience,
                    message: messages.get(&audience).cloned().unwrap_or_default(),
                    channel: policy.channel,
                    priority: policy.priority,
                }
            })
            .collect();

        // Delays are configurable, so keep the timeline chronological.
        timeline.sort_by_key(|e| (e.offset_seconds, e.priority));
        timeline
    }

    fn contacts(&self, incident: &Incident, assignments: &AssignmentMap) -> Vec<Contact> {
        let mut contacts = vec![
            Contact {
                name: "Emergency Services".to_string(),
                kind: ContactKind::EmergencyServices,
                phone: Some(self.config.emergency_phone.clone()),
                resource_id: None,
                priority: 1,
                notify_immediately: true,
            },
            Contact {
                name: "Event Manager".to_string(),
                kind: ContactKind::Management,
                phone: None,
                resource_id: None,
                priority: 2,
                notify_immediately: true,
            },
        ];

        // AssignmentMap is a BTreeMap, so resource ids come out ascending.
        contacts.extend(
            assignments
                .iter()
                .filter(|(_, incident_id)| **incident_id == incident.id)
                .map(|(resource_id, _)| Contact {
                    name: format!("Resource {resource_id}"),
                    kind: ContactKind::AssignedResource,
                    phone: None,
                    resource_id: Some(resource_id.clone()),
                    priority: 2,
                    notify_immediately: true,
                }),
        );

        contacts
    }
}

/// `at + secs`, saturating at the latest representable time.
fn offset_from(at: DateTime<Utc>, secs: u64) -> DateTime<Utc> {
    i64::try_from(secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|delta| at.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use respond_models::{Channel, IncidentId, IncidentKind, ResourceId, Severity};

    fn incident(severity: Severity) -> Incident {
        Incident::new(IncidentKind::Fire, (290.0, 240.0), severity)
            .with_id("inc-fire")
            .detected_at(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap())
    }

    fn assignments() -> AssignmentMap {
        AssignmentMap::from([
            (ResourceId::from("truck-2"), IncidentId::from("inc-fire")),
            (ResourceId::from("amb-1"), IncidentId::from("inc-medical")),
            (ResourceId::from("truck-1"), IncidentId::from("inc-fire")),
        ])
    }

    #[test]
    fn test_critical_incident_timeline() {
        let plan = CommunicationScheduler::default()
            .build_communication_plan(&incident(Severity::Critical), &assignments());

        let offsets: Vec<u64> = plan.timeline.iter().map(|e| e.offset_seconds).collect();
        assert_eq!(offsets, vec![0, 30, 120]);

        let announcement = &plan.timeline[2];
        assert_eq!(announcement.audience, Audience::Attendees);
        assert_eq!(announcement.channel, Channel::PublicAnnouncement);
        assert_eq!(announcement.priority, 3);
        assert_eq!(
            announcement.scheduled_at,
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 2, 0).unwrap()
        );
    }

    #[test]
    fn test_low_incident_has_no_public_announcement() {
        let plan = CommunicationScheduler::default()
            .build_communication_plan(&incident(Severity::Low), &assignments());

        assert_eq!(plan.timeline.len(), 2);
        assert_eq!(plan.entries_for(Audience::Attendees).count(), 0);
        // The attendee message is still prepared.
        assert!(plan.messages[&Audience::Attendees].starts_with("Please be aware"));
    }

    #[test]
    fn test_first_entry_is_direct_call() {
        let plan = CommunicationScheduler::default()
            .build_communication_plan(&incident(Severity::Medium), &AssignmentMap::new());

        let first = &plan.timeline[0];
        assert_eq!(first.audience, Audience::EmergencyServices);
        assert_eq!(first.channel, Channel::DirectCall);
        assert_eq!(first.priority, 1);
        assert_eq!(first.scheduled_at, incident(Severity::Medium).detected_at);
        assert_eq!(first.message, plan.messages[&Audience::EmergencyServices]);
    }

    #[test]
    fn test_contacts_list_only_this_incidents_resources() {
        let plan = CommunicationScheduler::default()
            .build_communication_plan(&incident(Severity::High), &assignments());

        let names: Vec<&str> = plan.contacts.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Emergency Services",
                "Event Manager",
                "Resource truck-1",
                "Resource truck-2"
            ]
        );
        assert_eq!(plan.contacts[0].phone.as_deref(), Some("911"));
        assert!(plan.contacts.iter().all(|c| c.notify_immediately));
        assert!(plan.contacts[2..].iter().all(|c| c.priority == 2));
    }

    #[test]
    fn test_custom_config() {
        let scheduler = CommunicationScheduler::new(
            SchedulerConfig::new()
                .with_emergency_phone("112")
                .with_staff_delay_secs(60)
                .with_public_delay_secs(45),
        );
        let plan =
            scheduler.build_communication_plan(&incident(Severity::High), &AssignmentMap::new());

        assert_eq!(plan.contacts[0].phone.as_deref(), Some("112"));
        let audiences: Vec<Audience> = plan.timeline.iter().map(|e| e.audience).collect();
        assert_eq!(
            audiences,
            vec![
                Audience::EmergencyServices,
                Audience::Attendees,
                Audience::EventStaff
            ]
        );
    }

    #[test]
    fn test_huge_delay_saturates_scheduled_time() {
        let scheduler = CommunicationScheduler::new(
            SchedulerConfig::new()
                .with_staff_delay_secs(i64::MAX as u64)
                .with_public_delay_secs(u64::MAX),
        );
        let incident = incident(Severity::Critical);
        let plan = scheduler.build_communication_plan(&incident, &AssignmentMap::new());

        assert_eq!(plan.timeline[0].scheduled_at, incident.detected_at);
        assert_eq!(plan.timeline[1].scheduled_at, DateTime::<Utc>::MAX_UTC);
        assert_eq!(plan.timeline[2].scheduled_at, DateTime::<Utc>::MAX_UTC);
        assert_eq!(plan.timeline[2].offset_seconds, u64::MAX);
    }

    #[test]
    fn test_offset_from_adds_seconds() {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(
            offset_from(at, 90),
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 1, 30).unwrap()
        );
    }

    #[test]
    fn test_plan_is_deterministic() {
        let scheduler = CommunicationScheduler::default();
        let a = scheduler.build_communication_plan(&incident(Severity::High), &assignments());
        let b = scheduler.build_communication_plan(&incident(Severity::High), &assignments());
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
