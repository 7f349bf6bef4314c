//! API request and response data models.
//!
//! These structures define the public JSON contract and are kept separate from the storage
//! models in [`crate::db::models`]. All of them derive `utoipa::ToSchema` for the generated docs.
//!
//! - [`auth`]: Login and registration payloads
//! - [`intake`]: Response to a patient intake submission
//! - [`patients`]: Patient listing and echo payloads
//! - [`users`]: Staff account views and the authenticated caller

pub mod auth;
pub mod intake;
pub mod patients;
pub mod users;
