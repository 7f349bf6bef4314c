//! Decoding of multipart text entries into JSON values.
//!
//! Browsers can only send strings in a multipart body, so the form assembler JSON-encodes
//! structured values and leaves scalars as plain text. On the way back in every text entry is
//! decoded according to its [`FieldKind`]. Fields without an explicit kind use
//! [`FieldKind::Auto`]: decode when the text is valid JSON, keep the raw string otherwise.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;
use utoipa::ToSchema;

/// Expected shape of a submitted text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Decode as JSON when possible, otherwise keep the raw string
    #[default]
    Auto,
    /// Always keep the raw string (identifiers, phone numbers, postal codes)
    Text,
    /// Must decode as JSON
    Json,
}

/// A `json` field carried text that is not valid JSON.
#[derive(Debug, Error)]
#[error("field '{field}' must contain valid JSON: {source}")]
pub struct FieldError {
    pub field: String,
    #[source]
    pub source: serde_json::Error,
}

impl FieldKind {
    pub fn decode(self, raw: &str) -> Result<Value, serde_json::Error> {
        match self {
            FieldKind::Text => Ok(Value::String(raw.to_string())),
            FieldKind::Json => serde_json::from_str(raw),
            FieldKind::Auto => Ok(serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))),
        }
    }
}

/// Per-field decoding rules, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldSchema {
    kinds: HashMap<String, FieldKind>,
}

impl FieldSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifier-like fields are kept verbatim so leading zeros and formatting survive.
    pub fn identifier_defaults() -> Self {
        ["cpf", "rg", "cartao_sus", "telefone", "cep"]
            .into_iter()
            .fold(Self::new(), |schema, name| schema.with(name, FieldKind::Text))
    }

    pub fn with(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.kinds.insert(name.into(), kind);
        self
    }

    /// Overlay `other` on this schema; its kinds win for the names it mentions.
    pub fn merged_with(mut self, other: FieldSchema) -> Self {
        self.kinds.extend(other.kinds);
        self
    }

    pub fn kind_of(&self, name: &str) -> FieldKind {
        self.kinds.get(name).copied().unwrap_or_default()
    }

    pub fn decode(&self, name: &str, raw: &str) -> Result<Value, FieldError> {
        self.kind_of(name).decode(raw).map_err(|source| FieldError {
            field: name.to_string(),
            source,
        })
    }
}
