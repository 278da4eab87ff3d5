//! Appointment endpoints.
//!
//! - `GET /api/appointments`: list, optionally filtered by `phone`, `doctorId`, `status`
//! - `POST /api/appointments`: book
//! - `GET /api/appointments/stats`: admin counters
//! - `GET /api/appointments/:id`, `DELETE /api/appointments/:id`
//! - `PUT /api/appointments/:id/status`: status transition
//! - `PUT /api/appointments/:id/clinical`: health status + doctor notes

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{require_text, ApiContext};
use crate::models::{
    self, Appointment, AppointmentFilter, AppointmentStats, AppointmentStatus, HealthStatus,
    NewAppointment,
};

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub phone: Option<String>,
    pub doctor_id: Option<String>,
    pub status: Option<String>,
}

impl ListQuery {
    fn into_filter(self) -> Result<AppointmentFilter, ApiError> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") | Some("ALL") => None,
            Some(raw) => Some(
                raw.parse::<AppointmentStatus>()
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?,
            ),
        };
        Ok(AppointmentFilter {
            patient_phone: self.phone.filter(|p| !p.trim().is_empty()),
            doctor_id: self.doctor_id.filter(|d| !d.trim().is_empty()),
            status,
        })
    }
}

#[derive(Serialize)]
pub struct AppointmentsResponse {
    pub appointments: Vec<Appointment>,
}

/// `GET /api/appointments`: filtered list, newest appointment date first.
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<ListQuery>,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    let filter = query.into_filter()?;
    let appointments = filter.apply(ctx.core.store().list()?);
    Ok(Json(AppointmentsResponse { appointments }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    pub patient_name: String,
    pub patient_phone: String,
    pub patient_problem: String,
    pub doctor_id: String,
    #[serde(default)]
    pub doctor_name: Option<String>,
    pub appointment_date: String,
    pub appointment_time: String,
}

impl CreateAppointmentRequest {
    fn validate(self) -> Result<NewAppointment, ApiError> {
        let doctor = models::find_doctor(self.doctor_id.trim())
            .ok_or_else(|| ApiError::BadRequest(format!("Unknown doctor: {}", self.doctor_id)))?;
        let doctor_name = self
            .doctor_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| doctor.name.to_string());

        Ok(NewAppointment {
            patient_name: require_text(&self.patient_name, "Patient name")
                .map_err(ApiError::BadRequest)?,
            patient_phone: require_text(&self.patient_phone, "Phone")
                .map_err(ApiError::BadRequest)?,
            patient_problem: require_text(&self.patient_problem, "Problem description")
                .map_err(ApiError::BadRequest)?,
            doctor_id: doctor.id.to_string(),
            doctor_name,
            appointment_date: require_text(&self.appointment_date, "Appointment date")
                .map_err(ApiError::BadRequest)?,
            appointment_time: require_text(&self.appointment_time, "Time slot")
                .map_err(ApiError::BadRequest)?,
        })
    }
}

/// `POST /api/appointments`: create a PENDING booking.
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(req): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Appointment>), ApiError> {
    let fields = req.validate()?;
    let appointment = ctx.core.store().create(fields)?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

/// `GET /api/appointments/stats`
pub async fn stats(State(ctx): State<ApiContext>) -> Result<Json<AppointmentStats>, ApiError> {
    let all = ctx.core.store().list()?;
    Ok(Json(AppointmentStats::from_appointments(&all)))
}

/// `GET /api/appointments/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<Appointment>, ApiError> {
    ctx.core
        .store()
        .get(&id)?
        .map(Json)
        .ok_or_else(|| ApiError::appointment_not_found(&id))
}

/// `DELETE /api/appointments/:id`: removes the record and its chat.
pub async fn delete(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if ctx.core.store().delete(&id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::appointment_not_found(&id))
    }
}

#[derive(Deserialize)]
pub struct StatusUpdateRequest {
    pub status: AppointmentStatus,
}

/// `PUT /api/appointments/:id/status`
pub async fn update_status(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    Json(req): Json<StatusUpdateRequest>,
) -> Result<Json<Appointment>, ApiError> {
    ctx.core
        .store()
        .update_status(&id, req.status)?
        .map(Json)
        .ok_or_else(|| ApiError::appointment_not_found(&id))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalUpdateRequest {
    pub health_status: HealthStatus,
    #[serde(default)]
    pub notes: String,
}

/// `PUT /api/appointments/:id/clinical`
pub async fn update_clinical(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    Json(req): Json<ClinicalUpdateRequest>,
) -> Result<Json<Appointment>, ApiError> {
    ctx.core
        .store()
        .update_clinical(&id, req.health_status, &req.notes)?
        .map(Json)
        .ok_or_else(|| ApiError::appointment_not_found(&id))
}
