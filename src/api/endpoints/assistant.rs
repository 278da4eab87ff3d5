//! AI assistant endpoints.
//!
//! - `POST /api/assistant/triage`: symptom triage
//! - `POST /api/assistant/medicine`: plain-language medicine card
//! - `POST /api/assistant/chat`: history-aware conversation
//!
//! Gateway calls block on the network, so each runs on the blocking pool.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::gateway::{ChatTurn, MedicineInfo, TriageResult};
use crate::models::{history_summary, AppointmentFilter};

/// Earlier turns sent back to the model, newest kept.
const MAX_PRIOR_TURNS: usize = 20;

#[derive(Deserialize)]
pub struct TriageRequest {
    pub symptoms: String,
}

/// `POST /api/assistant/triage`
pub async fn triage(
    State(ctx): State<ApiContext>,
    Json(req): Json<TriageRequest>,
) -> Result<Json<TriageResult>, ApiError> {
    let gateway = ctx.core.gateway();
    let result = tokio::task::spawn_blocking(move || gateway.triage(&req.symptoms))
        .await
        .map_err(|e| ApiError::Internal(format!("Triage task failed: {e}")))??;
    Ok(Json(result))
}

#[derive(Deserialize)]
pub struct MedicineRequest {
    pub name: String,
}

/// `POST /api/assistant/medicine`
pub async fn medicine(
    State(ctx): State<ApiContext>,
    Json(req): Json<MedicineRequest>,
) -> Result<Json<MedicineInfo>, ApiError> {
    let gateway = ctx.core.gateway();
    let info = tokio::task::spawn_blocking(move || gateway.medicine_lookup(&req.name))
        .await
        .map_err(|e| ApiError::Internal(format!("Medicine lookup task failed: {e}")))??;
    Ok(Json(info))
}

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Patient phone; when present, their visit history grounds the reply.
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// `POST /api/assistant/chat`
pub async fn chat(
    State(ctx): State<ApiContext>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let summary = match req.phone.as_deref().map(str::trim) {
        Some(phone) if !phone.is_empty() => {
            let own = AppointmentFilter::for_patient(phone).apply(ctx.core.store().list()?);
            history_summary(&own)
        }
        _ => String::new(),
    };

    let mut prior = req.history;
    if prior.len() > MAX_PRIOR_TURNS {
        prior.drain(..prior.len() - MAX_PRIOR_TURNS);
    }

    let gateway = ctx.core.gateway();
    let message = req.message;
    let reply = tokio::task::spawn_blocking(move || gateway.converse(&message, &summary, &prior))
        .await
        .map_err(|e| ApiError::Internal(format!("Assistant task failed: {e}")))??;
    Ok(Json(ChatResponse { reply }))
}
