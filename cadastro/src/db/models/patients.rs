use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A patient record as returned by the read endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Patient {
    pub id: String,
    pub nome: String,
    pub cpf: String,
    pub data_nascimento: String,
    pub tipo_diabetes: String,
    pub telefone: String,
    pub email: String,
}
