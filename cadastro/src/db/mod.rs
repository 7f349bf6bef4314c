//! Data access layer.
//!
//! Handlers never touch storage directly; they go through the repositories in [`handlers`].
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  (API request handlers)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │ Repositories│  (db::handlers - PatientRepository, Users)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │   Models    │  (db::models - stored records)
//! └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`handlers`]: the read-only [`handlers::PatientRepository`] seam with its seed-data
//!   implementation, and the in-memory account store
//! - [`models`]: stored record structures
//! - [`errors`]: store-specific error types
//!
//! The patient read path is a trait object in [`crate::AppState`], so a real store can replace
//! the seed data without touching the handlers.

pub mod errors;
pub mod handlers;
pub mod models;
