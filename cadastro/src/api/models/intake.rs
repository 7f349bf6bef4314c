//! Intake submission response.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::intake::IntakeOutcome;

pub const INTAKE_SUCCESS_MESSAGE: &str = "Paciente cadastrado com sucesso";

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IntakeResponse {
    pub message: String,
    /// The reconstructed patient record, field name → decoded value
    #[schema(value_type = Object)]
    pub paciente: serde_json::Map<String, Value>,
    /// Public path of every stored document, in upload order
    pub arquivos: Vec<String>,
}

impl From<IntakeOutcome> for IntakeResponse {
    fn from(outcome: IntakeOutcome) -> Self {
        let arquivos = outcome.public_paths();
        Self {
            message: INTAKE_SUCCESS_MESSAGE.to_string(),
            paciente: outcome.record,
            arquivos,
        }
    }
}
