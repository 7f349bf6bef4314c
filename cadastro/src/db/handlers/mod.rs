//! Repository implementations.
//!
//! - [`repository`]: the read-only [`PatientRepository`] trait
//! - [`patients`]: [`SeedPatients`], the fixed demonstration records
//! - [`users`]: [`Users`], the in-memory account store behind login/registration

pub mod patients;
pub mod repository;
pub mod users;

pub use patients::SeedPatients;
pub use repository::PatientRepository;
pub use users::Users;
