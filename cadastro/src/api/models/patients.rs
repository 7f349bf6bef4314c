use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const ECHO_MESSAGE: &str = "Paciente recebido com sucesso";

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EchoResponse {
    pub message: String,
}
