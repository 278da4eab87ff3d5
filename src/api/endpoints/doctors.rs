//! Roster endpoints.
//!
//! - `GET /api/doctors`: all doctors
//! - `GET /api/doctors/:id`: one doctor
//! - `GET /api/time-slots`: bookable windows

use axum::extract::Path;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::models::{self, Doctor};

#[derive(Serialize)]
pub struct DoctorsResponse {
    pub doctors: &'static [Doctor],
}

pub async fn list() -> Json<DoctorsResponse> {
    Json(DoctorsResponse {
        doctors: models::DOCTORS,
    })
}

pub async fn detail(Path(id): Path<String>) -> Result<Json<&'static Doctor>, ApiError> {
    models::find_doctor(&id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Doctor {id} not found")))
}

#[derive(Serialize)]
pub struct TimeSlotsResponse {
    pub slots: Vec<String>,
}

pub async fn time_slots() -> Json<TimeSlotsResponse> {
    Json(TimeSlotsResponse {
        slots: models::time_slots(),
    })
}
