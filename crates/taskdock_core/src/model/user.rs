//! User domain model.
//!
//! # Responsibility
//! - Define the persisted user record plus its draft and patch shapes.
//!
//! # Invariants
//! - `id` is assigned by the store on insert and never reused.
//! - `email` must look like an address; uniqueness is a store constraint.

use super::{validate_email, validate_username, ValidationError};
use serde::{Deserialize, Serialize};

/// Store-assigned stable identifier for users.
pub type UserId = i64;

/// Persisted user record as returned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub username: String,
    /// Unix epoch milliseconds, set by the store on insert.
    pub created_at: i64,
    /// Unix epoch milliseconds, bumped by the store on every update.
    pub updated_at: i64,
}

impl User {
    /// Checks persisted field shape; read paths reject rows failing this.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_email(&self.email)?;
        validate_username(&self.username)?;
        Ok(())
    }
}

/// Creation draft; the store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub username: String,
}

impl NewUser {
    pub fn new(email: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            username: username.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_email(&self.email)?;
        validate_username(&self.username)?;
        Ok(())
    }
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub email: Option<String>,
    pub username: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.username.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::EmptyPatch);
        }
        if let Some(email) = self.email.as_deref() {
            validate_email(email)?;
        }
        if let Some(username) = self.username.as_deref() {
            validate_username(username)?;
        }
        Ok(())
    }
}
