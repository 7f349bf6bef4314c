//! HTTP request handlers for all API endpoints.
//!
//! # Handler Modules
//!
//! - [`auth`]: Login, registration and the current session
//! - [`intake`]: Multipart patient intake with document upload
//! - [`patients`]: Patient listing, lookup and the echo endpoint
//!
//! # Error Handling
//!
//! Handlers return [`crate::errors::Error`], which converts to the matching HTTP status and a
//! `{ "error": "..." }` JSON body.

pub mod auth;
pub mod intake;
pub mod patients;
