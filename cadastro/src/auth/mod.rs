//! Authentication for the staff-facing API.
//!
//! Staff accounts sign in with email and password through `/authentication/login` (or create an
//! account through `/authentication/register` when registration is open). Both return a signed
//! JWT which clients send back as `Authorization: Bearer <token>`.
//!
//! Patient routes are open by default. Setting `auth.protect_patient_routes` puts every `/api/*`
//! route behind [`middleware::require_user`].
//!
//! # Modules
//!
//! - [`current_user`]: Extractor for the authenticated user in handlers
//! - [`middleware`]: Route protection middleware
//! - [`password`]: Password hashing and verification using Argon2
//! - [`session`]: JWT session token creation and verification
//!
//! # Usage in Handlers
//!
//! ```ignore
//! use cadastro::api::models::users::CurrentUser;
//!
//! async fn protected_handler(user: CurrentUser) -> String {
//!     format!("Olá, {}!", user.name)
//! }
//! ```

pub mod current_user;
pub mod middleware;
pub mod password;
pub mod session;
