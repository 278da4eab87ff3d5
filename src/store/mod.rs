//! Appointment record store.
//!
//! Sole authority over appointment and chat records. The whole collection
//! lives in one named slot and every operation is a read-modify-write of
//! that slot. Writers inside this process are serialized by `write_lock`;
//! a second process sharing the same medium is still last-write-wins.
//!
//! Operations addressing an unknown id leave the collection untouched and
//! report the absence through their return value (`None` / `false`)
//! instead of an error.

pub mod events;

pub use events::{EventBus, StoreEvent};

use std::sync::{Arc, Mutex};

use chrono::{Local, Utc};
use thiserror::Error;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::config::APPOINTMENTS_SLOT;
use crate::db::{SlotStorage, StorageError};
use crate::models::{
    Appointment, AppointmentStatus, ChatMessage, HealthStatus, NewAppointment, SenderRole,
};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Appointment storage unavailable: {0}")]
    PersistenceUnavailable(#[from] StorageError),

    #[error("Stored appointment collection is unreadable: {0}")]
    CorruptCollection(#[from] serde_json::Error),

    #[error("Store lock poisoned")]
    LockPoisoned,
}

pub struct AppointmentStore {
    slots: Arc<dyn SlotStorage>,
    key: String,
    write_lock: Mutex<()>,
    events: EventBus,
}

impl AppointmentStore {
    /// Store over the default appointments slot.
    pub fn new(slots: Arc<dyn SlotStorage>) -> Self {
        Self::with_key(slots, APPOINTMENTS_SLOT)
    }

    pub fn with_key(slots: Arc<dyn SlotStorage>, key: &str) -> Self {
        Self {
            slots,
            key: key.to_string(),
            write_lock: Mutex::new(()),
            events: EventBus::new(),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.slots.backend_name()
    }

    /// Change feed for every committed mutation.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    // ── Reads ───────────────────────────────────────────────

    /// All appointments in storage order.
    pub fn list(&self) -> Result<Vec<Appointment>, StoreError> {
        self.load()
    }

    pub fn get(&self, id: &str) -> Result<Option<Appointment>, StoreError> {
        Ok(self.load()?.into_iter().find(|a| a.id == id))
    }

    /// Chat log of one appointment, `None` if the id is unknown.
    pub fn messages(&self, id: &str) -> Result<Option<Vec<ChatMessage>>, StoreError> {
        Ok(self.get(id)?.map(|a| a.chat_history))
    }

    // ── Writes ──────────────────────────────────────────────

    pub fn create(&self, fields: NewAppointment) -> Result<Appointment, StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        let mut appointments = self.load()?;

        let id = fresh_id(|candidate| appointments.iter().any(|a| a.id == candidate));
        let appointment = Appointment {
            id,
            patient_name: fields.patient_name,
            patient_phone: fields.patient_phone,
            patient_problem: fields.patient_problem,
            doctor_id: fields.doctor_id,
            doctor_name: fields.doctor_name,
            appointment_date: fields.appointment_date,
            appointment_time: fields.appointment_time,
            status: AppointmentStatus::Pending,
            created_at: Utc::now(),
            health_status: Some(HealthStatus::Fair),
            doctor_notes: None,
            chat_history: Vec::new(),
        };

        appointments.push(appointment.clone());
        self.persist(&appointments)?;

        tracing::info!(
            appointment_id = %appointment.id,
            doctor_id = %appointment.doctor_id,
            "Appointment created"
        );
        self.events.publish(StoreEvent::Created {
            appointment_id: appointment.id.clone(),
        });
        Ok(appointment)
    }

    pub fn update_status(
        &self,
        id: &str,
        status: AppointmentStatus,
    ) -> Result<Option<Appointment>, StoreError> {
        let event = StoreEvent::StatusChanged {
            appointment_id: id.to_string(),
            status,
        };
        let updated = self.modify(id, |appt| appt.status = status, event)?;
        if updated.is_some() {
            tracing::info!(appointment_id = %id, %status, "Appointment status updated");
        }
        Ok(updated)
    }

    pub fn update_clinical(
        &self,
        id: &str,
        health_status: HealthStatus,
        notes: &str,
    ) -> Result<Option<Appointment>, StoreError> {
        let event = StoreEvent::ClinicalUpdated {
            appointment_id: id.to_string(),
        };
        let updated = self.modify(
            id,
            |appt| {
                appt.health_status = Some(health_status);
                appt.doctor_notes = Some(notes.to_string());
            },
            event,
        )?;
        if updated.is_some() {
            tracing::info!(appointment_id = %id, %health_status, "Clinical fields updated");
        }
        Ok(updated)
    }

    /// Append a chat message. A prescription also replaces the doctor
    /// notes with its text, in the same write as the append.
    pub fn append_message(
        &self,
        id: &str,
        sender_role: SenderRole,
        text: &str,
        is_prescription: bool,
    ) -> Result<Option<Appointment>, StoreError> {
        let message = ChatMessage {
            id: Uuid::new_v4().to_string(),
            sender_role,
            text: text.to_string(),
            timestamp: Local::now().format("%H:%M").to_string(),
            is_prescription,
        };
        let message_id = message.id.clone();
        let event = StoreEvent::MessageAppended {
            appointment_id: id.to_string(),
            message_id: message_id.clone(),
            is_prescription,
        };

        let updated = self.modify(
            id,
            move |appt| {
                if is_prescription {
                    appt.doctor_notes = Some(message.text.clone());
                }
                appt.chat_history.push(message);
            },
            event,
        )?;

        if updated.is_some() {
            tracing::debug!(
                appointment_id = %id,
                %message_id,
                role = %sender_role,
                is_prescription,
                "Chat message appended"
            );
        }
        Ok(updated)
    }

    /// Remove the record and its chat history. Returns whether it existed.
    pub fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        let mut appointments = self.load()?;
        let before = appointments.len();
        appointments.retain(|a| a.id != id);

        if appointments.len() == before {
            tracing::warn!(appointment_id = %id, "Delete skipped: appointment not found");
            return Ok(false);
        }

        self.persist(&appointments)?;
        tracing::info!(appointment_id = %id, "Appointment deleted");
        self.events.publish(StoreEvent::Deleted {
            appointment_id: id.to_string(),
        });
        Ok(true)
    }

    // ── Internals ───────────────────────────────────────────

    /// Apply `change` to the record with `id`, write the collection back and
    /// publish `event` while the write lock is still held, so the feed order
    /// matches commit order. Nothing is written or published when the id is
    /// absent.
    fn modify<F>(
        &self,
        id: &str,
        change: F,
        event: StoreEvent,
    ) -> Result<Option<Appointment>, StoreError>
    where
        F: FnOnce(&mut Appointment),
    {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        let mut appointments = self.load()?;

        let Some(appt) = appointments.iter_mut().find(|a| a.id == id) else {
            tracing::warn!(appointment_id = %id, "Update skipped: appointment not found");
            return Ok(None);
        };
        change(appt);
        let updated = appt.clone();

        self.persist(&appointments)?;
        self.events.publish(event);
        Ok(Some(updated))
    }

    fn load(&self) -> Result<Vec<Appointment>, StoreError> {
        match self.slots.read_slot(&self.key)? {
            Some(raw) if !raw.trim().is_empty() => Ok(serde_json::from_str(&raw)?),
            _ => Ok(Vec::new()),
        }
    }

    fn persist(&self, appointments: &[Appointment]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(appointments)?;
        self.slots.write_slot(&self.key, &raw)?;
        Ok(())
    }
}

/// Random v4 id, redrawn while `taken` reports a collision.
fn fresh_id<F>(taken: F) -> String
where
    F: Fn(&str) -> bool,
{
    loop {
        let candidate = Uuid::new_v4().to_string();
        if !taken(&candidate) {
            return candidate;
        }
    }
}
