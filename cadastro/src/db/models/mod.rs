//! Stored record structures.

pub mod patients;
pub mod users;
