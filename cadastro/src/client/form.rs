//! Client-side assembly of the intake form.
//!
//! Mirrors what the reception screen sends: scalar fields as plain text, structured fields
//! (medication lists, exam panels) JSON-encoded, and every document under one shared part name.
//! Nothing is validated here; the server decides what it accepts.

use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

use super::error::{ClientError, Result};

pub const DEFAULT_FILE_FIELD: &str = "documento";

#[derive(Debug, Clone, PartialEq)]
pub enum FormEntry {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        content_type: Option<String>,
        content: Vec<u8>,
    },
}

#[derive(Debug, Clone)]
pub struct IntakeForm {
    file_field: String,
    entries: Vec<FormEntry>,
}

impl Default for IntakeForm {
    fn default() -> Self {
        Self::new()
    }
}

impl IntakeForm {
    pub fn new() -> Self {
        Self::with_file_field(DEFAULT_FILE_FIELD)
    }

    pub fn with_file_field(file_field: impl Into<String>) -> Self {
        Self {
            file_field: file_field.into(),
            entries: Vec::new(),
        }
    }

    /// Add a field sent verbatim
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.push(FormEntry::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Add a structured field, JSON-encoded
    pub fn json<T: Serialize + ?Sized>(self, name: impl Into<String>, value: &T) -> Result<Self> {
        let encoded = serde_json::to_string(value)?;
        Ok(self.text(name, encoded))
    }

    /// Add a field the way the reception screen does: strings as-is, numbers and booleans as
    /// their literal text, arrays and objects JSON-encoded. Nulls are left out.
    pub fn value(self, name: impl Into<String>, value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(self),
            Value::String(s) => Ok(self.text(name, s.as_str())),
            Value::Bool(_) | Value::Number(_) => Ok(self.text(name, value.to_string())),
            Value::Array(_) | Value::Object(_) => self.json(name, value),
        }
    }

    /// Add every field of a record with [`IntakeForm::value`]
    pub fn record(self, record: &serde_json::Map<String, Value>) -> Result<Self> {
        record.iter().try_fold(self, |form, (name, value)| form.value(name.as_str(), value))
    }

    /// Attach a document under the shared file field
    pub fn file(mut self, file_name: impl Into<String>, content_type: Option<&str>, content: impl Into<Vec<u8>>) -> Self {
        self.entries.push(FormEntry::File {
            name: self.file_field.clone(),
            file_name: file_name.into(),
            content_type: content_type.map(str::to_string),
            content: content.into(),
        });
        self
    }

    /// Attach a document read from disk; the content type is guessed from the extension
    pub async fn file_from_path(self, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read(path).await.map_err(|source| ClientError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "arquivo".to_string());
        let content_type = mime_guess::from_path(path).first().map(|m| m.to_string());

        Ok(self.file(file_name, content_type.as_deref(), content))
    }

    pub fn entries(&self) -> &[FormEntry] {
        &self.entries
    }

    pub fn into_multipart(self) -> Result<Form> {
        let mut form = Form::new();
        for entry in self.entries {
            form = match entry {
                FormEntry::Text { name, value } => form.text(name, value),
                FormEntry::File {
                    name,
                    file_name,
                    content_type,
                    content,
                } => {
                    let mut part = Part::bytes(content).file_name(file_name);
                    if let Some(content_type) = content_type {
                        part = part.mime_str(&content_type)?;
                    }
                    form.part(name, part)
                }
            };
        }
        Ok(form)
    }
}
