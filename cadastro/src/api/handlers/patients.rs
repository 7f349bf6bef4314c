use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::Value;
use tracing::info;

use crate::{
    AppState,
    api::models::patients::{ECHO_MESSAGE, EchoResponse},
    db::models::patients::Patient,
    errors::{Error, ErrorResponse},
};

/// List registered patients
#[utoipa::path(
    get,
    path = "/api/pacientes",
    tag = "pacientes",
    responses(
        (status = 200, description = "All patients, in registration order", body = [Patient]),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_patients(State(state): State<AppState>) -> Result<Json<Vec<Patient>>, Error> {
    Ok(Json(state.patients.list().await?))
}

/// Get a patient by ID
#[utoipa::path(
    get,
    path = "/api/pacientes/{id}",
    tag = "pacientes",
    params(
        ("id" = String, Path, description = "Patient ID"),
    ),
    responses(
        (status = 200, description = "Patient found", body = Patient),
        (status = 404, description = "No patient with this ID", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip(state))]
pub async fn get_patient(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Patient>, Error> {
    match state.patients.get_by_id(&id).await? {
        Some(patient) => Ok(Json(patient)),
        None => Err(Error::NotFound {
            resource: "Paciente".to_string(),
            id,
        }),
    }
}

/// Acknowledge a patient payload without storing it
#[utoipa::path(
    post,
    path = "/api/paciente",
    tag = "pacientes",
    request_body(content = Object, description = "Any JSON document"),
    responses(
        (status = 200, description = "Payload received", body = EchoResponse),
        (status = 405, description = "Only POST is accepted", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn echo_patient(Json(payload): Json<Value>) -> Json<EchoResponse> {
    info!(payload = %payload, "Patient payload received");
    Json(EchoResponse {
        message: ECHO_MESSAGE.to_string(),
    })
}

/// Fallback for non-POST methods on the echo route
pub async fn method_not_allowed() -> Error {
    Error::MethodNotAllowed
}
