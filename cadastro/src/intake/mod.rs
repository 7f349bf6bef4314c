//! Patient intake pipeline.
//!
//! A submission arrives as a multipart body: text entries carrying patient fields (scalars as
//! plain strings, structured values JSON-encoded) plus zero or more documents under a reserved
//! file field. The pipeline rebuilds a [`PatientRecord`] from the text entries using a
//! [`FieldSchema`], then writes the documents under a per-patient directory through the
//! [`UploadStore`].
//!
//! Persistence is write-and-forget: nothing indexes the record afterwards, and a failure part way
//! through a submission leaves the files already written in place.

mod fields;
mod storage;

pub use fields::{FieldError, FieldKind, FieldSchema};
pub use storage::{StorageError, StoredFile, UploadStore, sanitize_file_name, sanitize_segment};

use bytes::Bytes;
use chrono::Utc;
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::config::{IntakeConfig, UploadsConfig};

/// Field name → decoded value. No fixed server-side schema.
pub type PatientRecord = serde_json::Map<String, Value>;

/// One attached document as received from the client.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub content_type: Option<String>,
    pub content: Bytes,
}

impl UploadedFile {
    /// Declared content type, or a guess from the file name
    pub fn content_type(&self) -> String {
        self.content_type
            .clone()
            .unwrap_or_else(|| mime_guess::from_path(&self.name).first_or_octet_stream().to_string())
    }
}

/// Everything collected from one multipart request.
#[derive(Debug, Default)]
pub struct IntakeSubmission {
    pub record: PatientRecord,
    pub files: Vec<UploadedFile>,
}

/// Result of persisting a submission.
#[derive(Debug)]
pub struct IntakeOutcome {
    pub record: PatientRecord,
    pub directory: String,
    pub stored: Vec<StoredFile>,
}

impl IntakeOutcome {
    pub fn public_paths(&self) -> Vec<String> {
        self.stored.iter().map(|f| f.public_path.clone()).collect()
    }
}

#[derive(Debug, Clone)]
pub struct IntakePipeline {
    schema: FieldSchema,
    file_field: String,
    identifier_field: String,
    store: UploadStore,
}

impl IntakePipeline {
    pub fn new(schema: FieldSchema, file_field: impl Into<String>, identifier_field: impl Into<String>, store: UploadStore) -> Self {
        Self {
            schema,
            file_field: file_field.into(),
            identifier_field: identifier_field.into(),
            store,
        }
    }

    pub fn from_config(intake: &IntakeConfig, uploads: &UploadsConfig) -> Self {
        Self::new(
            intake.fields.clone(),
            &intake.file_field,
            &intake.identifier_field,
            UploadStore::new(&uploads.root, &uploads.public_prefix),
        )
    }

    pub fn file_field(&self) -> &str {
        &self.file_field
    }

    pub fn store(&self) -> &UploadStore {
        &self.store
    }

    /// Decode a text entry into the record. A repeated name replaces the earlier value.
    pub fn accept_text(&self, submission: &mut IntakeSubmission, name: &str, raw: &str) -> Result<(), FieldError> {
        let value = self.schema.decode(name, raw)?;
        submission.record.insert(name.to_string(), value);
        Ok(())
    }

    /// Queue a file entry. Only files under the reserved field are kept; returns whether it was.
    pub fn accept_file(&self, submission: &mut IntakeSubmission, name: &str, file: UploadedFile) -> bool {
        if name != self.file_field {
            warn!(field = name, file_name = %file.name, "Ignoring file outside the document field");
            return false;
        }
        submission.files.push(file);
        true
    }

    /// The patient identifier used to name the storage directory, if the record has a usable one.
    pub fn identifier(&self, record: &PatientRecord) -> Option<String> {
        let raw = match record.get(&self.identifier_field)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        sanitize_segment(&raw)
    }

    /// Write every queued file and hand back the record with the stored locations.
    #[instrument(skip_all, fields(files = submission.files.len()))]
    pub async fn persist(&self, submission: IntakeSubmission) -> Result<IntakeOutcome, StorageError> {
        let directory = self
            .identifier(&submission.record)
            .unwrap_or_else(|| Utc::now().timestamp_millis().to_string());

        self.store.ensure_dir(&directory).await?;

        let mut stored = Vec::with_capacity(submission.files.len());
        for file in &submission.files {
            stored.push(self.store.store(&directory, file).await?);
        }

        metrics::counter!("cadastro_intake_submissions_total").increment(1);
        metrics::counter!("cadastro_intake_files_stored_total").increment(stored.len() as u64);

        info!(
            directory = %directory,
            fields = submission.record.len(),
            files = stored.len(),
            "Patient intake persisted"
        );

        Ok(IntakeOutcome {
            record: submission.record,
            directory,
            stored,
        })
    }
}
