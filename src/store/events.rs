use serde::Serialize;
use tokio::sync::broadcast;

use crate::models::AppointmentStatus;

/// Buffered events per subscriber before the slowest one starts lagging.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// A committed change to the appointment collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum StoreEvent {
    Created {
        appointment_id: String,
    },
    StatusChanged {
        appointment_id: String,
        status: AppointmentStatus,
    },
    ClinicalUpdated {
        appointment_id: String,
    },
    MessageAppended {
        appointment_id: String,
        message_id: String,
        is_prescription: bool,
    },
    Deleted {
        appointment_id: String,
    },
}

impl StoreEvent {
    pub fn appointment_id(&self) -> &str {
        match self {
            Self::Created { appointment_id }
            | Self::StatusChanged { appointment_id, .. }
            | Self::ClinicalUpdated { appointment_id }
            | Self::MessageAppended { appointment_id, .. }
            | Self::Deleted { appointment_id } => appointment_id,
        }
    }
}

/// Fan-out of store events. Publishing never blocks and never fails the
/// mutation that produced the event.
pub struct EventBus {
    tx: broadcast::Sender<StoreEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.tx.subscribe()
    }

    pub fn publish(&self, event: StoreEvent) {
        // Err only means nobody is listening right now.
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serializes_with_kind_tag() {
        let event = StoreEvent::StatusChanged {
            appointment_id: "a1".into(),
            status: AppointmentStatus::Confirmed,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "status_changed");
        assert_eq!(json["appointmentId"], "a1");
        assert_eq!(json["status"], "CONFIRMED");
    }

    #[test]
    fn event_fields_are_camel_case() {
        let event = StoreEvent::MessageAppended {
            appointment_id: "a1".into(),
            message_id: "m1".into(),
            is_prescription: true,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "message_appended");
        assert_eq!(json["appointmentId"], "a1");
        assert_eq!(json["messageId"], "m1");
        assert_eq!(json["isPrescription"], true);
        assert!(json.get("appointment_id").is_none());
    }

    #[test]
    fn publish_without_subscribers_is_silent() {
        let bus = EventBus::new();
        bus.publish(StoreEvent::Deleted {
            appointment_id: "gone".into(),
        });
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn subscriber_receives_published_event() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        bus.publish(StoreEvent::Created {
            appointment_id: "a1".into(),
        });
        let event = rx.recv().await.unwrap();
        assert_eq!(event.appointment_id(), "a1");
    }
}
