use crate::db::errors::DbError;
use crate::intake::{FieldError, StorageError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;
use utoipa::ToSchema;

/// Fixed message returned for any failure while persisting an intake submission
pub const INTAKE_FAILURE_MESSAGE: &str = "Erro ao cadastrar paciente";

#[derive(ThisError, Debug)]
pub enum Error {
    /// Authentication required but not provided
    #[error("Not authenticated")]
    Unauthenticated { message: Option<String> },

    /// Invalid request data or business rule violation
    #[error("{message}")]
    BadRequest { message: String },

    /// Requested resource not found
    #[error("{resource} with ID {id} not found")]
    NotFound { resource: String, id: String },

    /// Route exists but not for this HTTP method
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Uploaded content exceeds the configured limits
    #[error("{message}")]
    PayloadTooLarge { message: String },

    /// Conflict error, e.g. an account that already exists
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// A multipart text field did not match its declared shape
    #[error(transparent)]
    Field(#[from] FieldError),

    /// Upload persistence failed; details are logged, never returned
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The intake submission could not be read; details are logged, never returned
    #[error("Failed to read intake submission: {reason}")]
    Intake { reason: String },

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Store operation error
    #[error(transparent)]
    Database(#[from] DbError),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// JSON body of every error response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            Error::BadRequest { .. } | Error::Field(_) => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Error::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Error::Conflict { .. } => StatusCode::CONFLICT,
            Error::Storage(_) | Error::Intake { .. } | Error::Internal { .. } | Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Database(db_err) => match db_err {
                DbError::NotFound => StatusCode::NOT_FOUND,
                DbError::UniqueViolation { .. } => StatusCode::CONFLICT,
                DbError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::Unauthenticated { message } => message.clone().unwrap_or_else(|| "Autenticação necessária".to_string()),
            Error::BadRequest { message } => message.clone(),
            Error::NotFound { resource, .. } => format!("{resource} não encontrado"),
            Error::MethodNotAllowed => "Método não permitido".to_string(),
            Error::PayloadTooLarge { message } => message.clone(),
            Error::Conflict { message } => message.clone(),
            Error::Field(e) => format!("Campo '{}' deve conter JSON válido", e.field),
            Error::Storage(_) | Error::Intake { .. } => INTAKE_FAILURE_MESSAGE.to_string(),
            Error::Internal { .. } | Error::Other(_) => "Erro interno do servidor".to_string(),
            Error::Database(db_err) => match db_err {
                DbError::NotFound => "Registro não encontrado".to_string(),
                DbError::UniqueViolation { entity, field, .. } => match (entity.as_str(), field.as_str()) {
                    ("user", "email") => "Já existe uma conta com este e-mail".to_string(),
                    _ => "Registro já existe".to_string(),
                },
                DbError::Other(_) => "Erro interno do servidor".to_string(),
            },
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Storage(_)
            | Error::Intake { .. }
            | Error::Database(DbError::Other(_))
            | Error::Internal { .. }
            | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::PayloadTooLarge { .. } | Error::Conflict { .. } | Error::Database(_) => {
                tracing::warn!("Rejected request: {}", self);
            }
            Error::Unauthenticated { .. } => {
                tracing::info!("Authorization error: {}", self);
            }
            Error::BadRequest { .. } | Error::Field(_) | Error::NotFound { .. } | Error::MethodNotAllowed => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let body = ErrorResponse { error: self.user_message() };
        (self.status_code(), Json(body)).into_response()
    }
}

/// Convert from String errors (e.g., from external functions)
impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Internal { operation: msg }
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_storage_errors_hide_details() {
        let err = Error::Storage(StorageError::CreateDir {
            path: PathBuf::from("/srv/uploads/123"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        });

        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.user_message(), INTAKE_FAILURE_MESSAGE);
        assert!(!err.user_message().contains("/srv"));
    }

    #[test]
    fn test_unreadable_submission_hides_parser_details() {
        let err = Error::Intake {
            reason: "incomplete multipart stream".to_string(),
        };

        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.user_message(), INTAKE_FAILURE_MESSAGE);
    }

    #[test]
    fn test_not_found_message() {
        let err = Error::NotFound {
            resource: "Paciente".to_string(),
            id: "42".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.user_message(), "Paciente não encontrado");
    }

    #[test]
    fn test_unique_violation_maps_to_conflict() {
        let err = Error::Database(DbError::UniqueViolation {
            entity: "user".to_string(),
            field: "email".to_string(),
            value: "a@b.com".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.user_message(), "Já existe uma conta com este e-mail");
    }

    #[test]
    fn test_method_not_allowed() {
        assert_eq!(Error::MethodNotAllowed.status_code(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
