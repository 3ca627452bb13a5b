use crate::api::error::AppError;
use crate::api::handlers::MessageResponse;
use crate::entities::{attachments, patients};
use crate::services::patient_service::PatientInput;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct PatientRequest {
    pub name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub phone: Option<String>,
}

impl From<PatientRequest> for PatientInput {
    fn from(req: PatientRequest) -> Self {
        Self {
            name: req.name,
            date_of_birth: req.date_of_birth,
            phone: req.phone,
        }
    }
}

/// A patient record with its attachment metadata embedded.
#[derive(Serialize, ToSchema)]
pub struct PatientResponse {
    #[serde(flatten)]
    pub patient: patients::Model,
    pub attachments: Vec<attachments::Model>,
}

#[utoipa::path(
    get,
    path = "/patients",
    responses(
        (status = 200, description = "All patients, most recent first", body = [PatientResponse])
    ),
    tag = "patients"
)]
pub async fn list_patients(
    State(state): State<crate::AppState>,
) -> Result<Json<Vec<PatientResponse>>, AppError> {
    let patients = state.patients.list().await?;

    let mut response = Vec::with_capacity(patients.len());
    for patient in patients {
        let attachments = state.attachments.list_for_patient(patient.id).await?;
        response.push(PatientResponse {
            patient,
            attachments,
        });
    }

    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/patients",
    request_body = PatientRequest,
    responses(
        (status = 201, description = "Patient created", body = patients::Model),
        (status = 400, description = "Name missing or blank")
    ),
    tag = "patients"
)]
pub async fn create_patient(
    State(state): State<crate::AppState>,
    Json(req): Json<PatientRequest>,
) -> Result<(StatusCode, Json<patients::Model>), AppError> {
    let patient = state.patients.create(req.into()).await?;
    Ok((StatusCode::CREATED, Json(patient)))
}

#[utoipa::path(
    get,
    path = "/patients/{id}",
    params(
        ("id" = i32, Path, description = "Patient ID")
    ),
    responses(
        (status = 200, description = "Patient with attachments", body = PatientResponse),
        (status = 404, description = "Patient not found")
    ),
    tag = "patients"
)]
pub async fn get_patient(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PatientResponse>, AppError> {
    let patient = state.patients.get(id).await?;
    let attachments = state.attachments.list_for_patient(patient.id).await?;

    Ok(Json(PatientResponse {
        patient,
        attachments,
    }))
}

#[utoipa::path(
    put,
    path = "/patients/{id}",
    params(
        ("id" = i32, Path, description = "Patient ID")
    ),
    request_body = PatientRequest,
    responses(
        (status = 200, description = "Patient updated", body = patients::Model),
        (status = 400, description = "Name missing or blank"),
        (status = 404, description = "Patient not found")
    ),
    tag = "patients"
)]
pub async fn update_patient(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(req): Json<PatientRequest>,
) -> Result<Json<patients::Model>, AppError> {
    let patient = state.patients.update(id, req.into()).await?;
    Ok(Json(patient))
}

#[utoipa::path(
    delete,
    path = "/patients/{id}",
    params(
        ("id" = i32, Path, description = "Patient ID")
    ),
    responses(
        (status = 200, description = "Patient and attachment metadata deleted", body = MessageResponse),
        (status = 404, description = "Patient not found")
    ),
    tag = "patients"
)]
pub async fn delete_patient(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, AppError> {
    state.patients.delete(id).await?;
    Ok(Json(MessageResponse {
        message: "Patient deleted".to_string(),
    }))
}
