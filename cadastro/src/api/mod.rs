//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - **Authentication** (`/authentication/*`): Login, registration, current session
//! - **Patients** (`/api/pacientes`, `/api/paciente`): Intake, listing, lookup, echo
//! - **Uploads** (`/uploads/*`): Stored documents, served read-only
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with `utoipa`. The rendered reference is served at `/docs`.

pub mod handlers;
pub mod models;
