use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{AppointmentStatus, HealthStatus, SenderRole};

/// One booking request, as persisted in the appointments slot.
///
/// Field names are camelCase on the wire. `healthStatus`, `doctorNotes`
/// and `chatHistory` may be absent on records written by older clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub patient_name: String,
    /// Identity key of the patient across the store.
    pub patient_phone: String,
    pub patient_problem: String,
    pub doctor_id: String,
    pub doctor_name: String,
    pub appointment_date: String,
    pub appointment_time: String,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_status: Option<HealthStatus>,
    /// Latest prescription text, or whatever the doctor last saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_notes: Option<String>,
    #[serde(default)]
    pub chat_history: Vec<ChatMessage>,
}

impl Appointment {
    /// Health status with the store default applied to legacy records.
    pub fn effective_health_status(&self) -> HealthStatus {
        self.health_status.unwrap_or_default()
    }
}

/// One message in an appointment's chat thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub sender_role: SenderRole,
    pub text: String,
    /// Display-only local time ("HH:MM"). Ordering is insertion order.
    pub timestamp: String,
    #[serde(default)]
    pub is_prescription: bool,
}

/// Caller-supplied fields for a new booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    pub patient_name: String,
    pub patient_phone: String,
    pub patient_problem: String,
    pub doctor_id: String,
    pub doctor_name: String,
    pub appointment_date: String,
    pub appointment_time: String,
}
