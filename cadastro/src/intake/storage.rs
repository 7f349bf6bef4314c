//! Local-disk persistence for uploaded patient documents.
//!
//! Layout: `{root}/{directory}/{timestamp_ms}-{sanitized_name}`, exposed to clients as
//! `{public_prefix}/{directory}/{timestamp_ms}-{sanitized_name}`.
//!
//! Files are opened with create-new semantics. When two uploads with the same name land in the
//! same directory within the same millisecond, the later one gets a random suffix instead of
//! overwriting the earlier one.

use base64::{Engine as _, engine::general_purpose};
use chrono::Utc;
use rand::prelude::RngExt;
use rand::rng;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};
use utoipa::ToSchema;

use super::UploadedFile;

/// Name used when sanitizing leaves nothing behind
const FALLBACK_FILE_NAME: &str = "arquivo";

/// How many names to try before giving up on a single file
const MAX_NAME_ATTEMPTS: usize = 8;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to create upload directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write upload {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no free file name for '{name}' after {attempts} attempts")]
    NameExhausted { name: String, attempts: usize },
}

/// A file written to the upload root.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StoredFile {
    pub original_name: String,
    pub stored_name: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub public_path: String,
    #[serde(skip)]
    pub disk_path: PathBuf,
}

/// Replace every character outside `[A-Za-z0-9_.]` with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '.' { c } else { '_' })
        .collect();

    if sanitized.is_empty() {
        FALLBACK_FILE_NAME.to_string()
    } else {
        sanitized
    }
}

/// Accept an identifier as a single directory name, unchanged.
///
/// Returns `None` for values that are empty, `.` or `..`, or that contain a path separator or a
/// control character. Everything else (CPF punctuation included) is kept as submitted.
pub fn sanitize_segment(segment: &str) -> Option<String> {
    let segment = segment.trim();
    if segment.is_empty() || segment == "." || segment == ".." {
        return None;
    }
    if segment.chars().any(|c| c == '/' || c == '\\' || c.is_control()) {
        return None;
    }
    Some(segment.to_string())
}

fn random_suffix() -> String {
    let mut bytes = [0u8; 6];
    rng().fill(&mut bytes);
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
    public_prefix: String,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>, public_prefix: &str) -> Self {
        Self {
            root: root.into(),
            public_prefix: public_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn public_path(&self, directory: &str, stored_name: &str) -> String {
        format!("{}/{}/{}", self.public_prefix, directory, stored_name)
    }

    /// Create `{root}/{directory}` and its ancestors if missing. Idempotent.
    pub async fn ensure_dir(&self, directory: &str) -> Result<PathBuf, StorageError> {
        let path = self.root.join(directory);
        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|source| StorageError::CreateDir { path: path.clone(), source })?;
        Ok(path)
    }

    /// Write one file under `{root}/{directory}`, never overwriting an existing file.
    #[instrument(skip(self, file), fields(file_name = %file.name, size = file.content.len()), err)]
    pub async fn store(&self, directory: &str, file: &UploadedFile) -> Result<StoredFile, StorageError> {
        let dir = self.ensure_dir(directory).await?;
        let sanitized = sanitize_file_name(&file.name);
        let timestamp = Utc::now().timestamp_millis();

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let stored_name = if attempt == 0 {
                format!("{timestamp}-{sanitized}")
            } else {
                format!("{timestamp}-{}-{sanitized}", random_suffix())
            };
            let path = dir.join(&stored_name);

            let mut handle = match tokio::fs::OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(handle) => handle,
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    debug!(stored_name = %stored_name, attempt, "Upload name taken, retrying with suffix");
                    continue;
                }
                Err(source) => return Err(StorageError::Write { path, source }),
            };

            handle
                .write_all(&file.content)
                .await
                .map_err(|source| StorageError::Write { path: path.clone(), source })?;
            handle
                .flush()
                .await
                .map_err(|source| StorageError::Write { path: path.clone(), source })?;

            return Ok(StoredFile {
                original_name: file.name.clone(),
                public_path: self.public_path(directory, &stored_name),
                content_type: file.content_type(),
                size_bytes: file.content.len() as u64,
                stored_name,
                disk_path: path,
            });
        }

        Err(StorageError::NameExhausted {
            name: sanitized,
            attempts: MAX_NAME_ATTEMPTS,
        })
    }
}
