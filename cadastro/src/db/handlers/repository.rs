//! Read-only patient repository trait.

use crate::db::errors::Result;
use crate::db::models::patients::Patient;

/// Read access to patient records.
///
/// Handlers hold this as `Arc<dyn PatientRepository>`, so any backing store can be swapped in
/// at construction time.
#[async_trait::async_trait]
pub trait PatientRepository: Send + Sync {
    /// List every patient, in the store's natural order
    async fn list(&self) -> Result<Vec<Patient>>;

    /// Get a patient by ID
    async fn get_by_id(&self, id: &str) -> Result<Option<Patient>>;
}
