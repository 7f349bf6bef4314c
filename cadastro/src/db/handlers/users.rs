//! In-memory account store.
//!
//! Accounts live for the lifetime of the process. Emails are the unique key and are compared
//! case-insensitively.

use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::db::errors::{DbError, Result};
use crate::db::models::users::{UserCreateDBRequest, UserDBResponse};
use crate::types::UserId;

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug, Clone, Default)]
pub struct Users {
    by_email: Arc<DashMap<String, UserDBResponse>>,
}

impl Users {
    pub fn new() -> Self {
        Self::default()
    }

    #[instrument(skip(self, request), fields(email = %request.email), err)]
    pub fn create(&self, request: &UserCreateDBRequest) -> Result<UserDBResponse> {
        let email = normalize_email(&request.email);
        match self.by_email.entry(email.clone()) {
            Entry::Occupied(_) => Err(DbError::UniqueViolation {
                entity: "user".to_string(),
                field: "email".to_string(),
                value: email,
            }),
            Entry::Vacant(slot) => {
                let user = UserDBResponse {
                    id: Uuid::new_v4(),
                    name: request.name.clone(),
                    email,
                    password_hash: request.password_hash.clone(),
                    is_admin: request.is_admin,
                    created_at: Utc::now(),
                    last_login: None,
                };
                slot.insert(user.clone());
                Ok(user)
            }
        }
    }

    pub fn get_user_by_email(&self, email: &str) -> Option<UserDBResponse> {
        self.by_email.get(&normalize_email(email)).map(|u| u.value().clone())
    }

    pub fn get_by_id(&self, id: UserId) -> Option<UserDBResponse> {
        self.by_email.iter().find(|entry| entry.id == id).map(|entry| entry.value().clone())
    }

    /// Replace the password hash of an existing account
    pub fn update_password(&self, email: &str, password_hash: String) -> Result<UserDBResponse> {
        let mut user = self.by_email.get_mut(&normalize_email(email)).ok_or(DbError::NotFound)?;
        user.password_hash = password_hash;
        Ok(user.value().clone())
    }

    pub fn record_login(&self, id: UserId) -> Result<()> {
        let mut user = self.by_email.iter_mut().find(|entry| entry.id == id).ok_or(DbError::NotFound)?;
        user.last_login = Some(Utc::now());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.by_email.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_email.is_empty()
    }
}
