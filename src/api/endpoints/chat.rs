//! Per-appointment chat endpoints.
//!
//! - `GET /api/appointments/:id/messages`: full thread, insertion order
//! - `POST /api/appointments/:id/messages`: append (doctor prescriptions
//!   also replace the appointment's notes)

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{require_text, ApiContext};
use crate::models::{ChatMessage, SenderRole};

/// Longest accepted message body, in characters.
const MAX_MESSAGE_CHARS: usize = 4000;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesResponse {
    pub appointment_id: String,
    pub messages: Vec<ChatMessage>,
}

/// `GET /api/appointments/:id/messages`
pub async fn list(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<MessagesResponse>, ApiError> {
    let messages = ctx
        .core
        .store()
        .messages(&id)?
        .ok_or_else(|| ApiError::appointment_not_found(&id))?;

    Ok(Json(MessagesResponse {
        appointment_id: id,
        messages,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub sender_role: SenderRole,
    pub text: String,
    #[serde(default)]
    pub is_prescription: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    pub message: ChatMessage,
    pub doctor_notes: Option<String>,
}

/// `POST /api/appointments/:id/messages`
pub async fn send(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<SendMessageResponse>), ApiError> {
    let text = require_text(&req.text, "Message").map_err(ApiError::BadRequest)?;
    if text.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ApiError::BadRequest(format!(
            "Message too long (max {MAX_MESSAGE_CHARS} chars)"
        )));
    }
    if req.is_prescription && req.sender_role != SenderRole::Doctor {
        return Err(ApiError::BadRequest(
            "Only doctors can issue prescriptions".into(),
        ));
    }

    let appointment = ctx
        .core
        .store()
        .append_message(&id, req.sender_role, &text, req.is_prescription)?
        .ok_or_else(|| ApiError::appointment_not_found(&id))?;

    let message = appointment
        .chat_history
        .last()
        .cloned()
        .ok_or_else(|| ApiError::Internal("appended message missing from thread".into()))?;

    Ok((
        StatusCode::CREATED,
        Json(SendMessageResponse {
            message,
            doctor_notes: appointment.doctor_notes,
        }),
    ))
}
