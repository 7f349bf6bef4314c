use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
};
use bytes::BytesMut;
use tracing::{debug, warn};

use crate::{
    AppState,
    api::models::intake::IntakeResponse,
    errors::{Error, ErrorResponse},
    intake::{IntakeSubmission, UploadedFile},
};

fn multipart_error(e: MultipartError) -> Error {
    // The body limit surfaces as a multipart read failure
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return Error::PayloadTooLarge {
            message: "O envio excede o tamanho máximo permitido".to_string(),
        };
    }
    Error::Intake { reason: e.body_text() }
}

/// Register a patient from an intake form
///
/// Text parts become fields of the patient record; structured values are sent JSON-encoded and
/// decoded here. Documents are attached under the `documento` part (configurable) and written
/// to `{uploads}/{cpf or timestamp}/{timestamp}-{name}`.
#[utoipa::path(
    post,
    path = "/api/pacientes",
    tag = "pacientes",
    request_body(content_type = "multipart/form-data", description = "Patient fields plus zero or more `documento` files"),
    responses(
        (status = 200, description = "Patient registered", body = IntakeResponse),
        (status = 400, description = "A `json` field carried invalid JSON", body = ErrorResponse),
        (status = 413, description = "Document or request too large", body = ErrorResponse),
        (status = 500, description = "Submission could not be read or documents could not be stored", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_patient(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<IntakeResponse>, Error> {
    let mut multipart = multipart.map_err(|e| Error::Intake { reason: e.body_text() })?;
    let pipeline = &state.intake;
    let max_file_size = state.config.uploads.max_file_size;
    let mut submission = IntakeSubmission::default();

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();

        let Some(file_name) = field.file_name().map(str::to_string) else {
            let raw = field.text().await.map_err(multipart_error)?;
            pipeline.accept_text(&mut submission, &name, &raw)?;
            continue;
        };

        let content_type = field.content_type().map(str::to_string);
        let mut content = BytesMut::new();

        // Check size limit incrementally to fail fast
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            if (content.len() + chunk.len()) as u64 > max_file_size {
                warn!(
                    file_name = %file_name,
                    max_file_size = max_file_size,
                    "Document size limit exceeded, aborting upload"
                );
                return Err(Error::PayloadTooLarge {
                    message: format!(
                        "Arquivo '{}' excede o tamanho máximo de {} bytes ({} MB)",
                        file_name,
                        max_file_size,
                        max_file_size / (1024 * 1024)
                    ),
                });
            }
            content.extend_from_slice(&chunk);
        }

        // Browsers send an empty, unnamed part for a file input left blank
        if file_name.is_empty() && content.is_empty() {
            debug!(field = %name, "Skipping empty file part");
            continue;
        }

        debug!(field = %name, file_name = %file_name, size = content.len(), "Received document");
        pipeline.accept_file(
            &mut submission,
            &name,
            UploadedFile {
                name: file_name,
                content_type,
                content: content.freeze(),
            },
        );
    }

    let outcome = pipeline.persist(submission).await?;
    Ok(Json(IntakeResponse::from(outcome)))
}
