//! Session domain model.
//!
//! # Responsibility
//! - Define the persisted session record plus its draft and patch shapes.
//!
//! # Invariants
//! - The session id is caller-chosen, never store-assigned; `NewSession::new`
//!   merely offers a uuid-v4 token for callers without their own scheme.
//! - `expires_at` is a positive unix epoch millisecond timestamp; an expired
//!   session is still a valid record.

use super::user::UserId;
use super::{validate_expiry, validate_owner, validate_session_id, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Caller-supplied stable identifier for sessions.
pub type SessionId = String;

/// Persisted session record as returned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    /// Owning user; must reference an existing `users` row.
    pub user_id: UserId,
    /// Unix epoch milliseconds.
    pub expires_at: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Session {
    /// Checks persisted field shape; read paths reject rows failing this.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_session_id(&self.id)?;
        validate_owner(self.user_id)?;
        validate_expiry(self.expires_at)?;
        Ok(())
    }
}

/// Creation draft; unlike users and tasks the id travels with the draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
    pub id: SessionId,
    pub user_id: UserId,
    pub expires_at: i64,
}

impl NewSession {
    /// Creates a draft with a generated uuid-v4 token id.
    pub fn new(user_id: UserId, expires_at: i64) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), user_id, expires_at)
    }

    /// Creates a draft with a caller-supplied id.
    pub fn with_id(id: impl Into<String>, user_id: UserId, expires_at: i64) -> Self {
        Self {
            id: id.into(),
            user_id,
            expires_at,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_session_id(&self.id)?;
        validate_owner(self.user_id)?;
        validate_expiry(self.expires_at)?;
        Ok(())
    }
}

/// Partial update; expiry is the only mutable session field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionPatch {
    pub expires_at: Option<i64>,
}

impl SessionPatch {
    pub fn is_empty(&self) -> bool {
        self.expires_at.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.expires_at {
            None => Err(ValidationError::EmptyPatch),
            Some(value) => validate_expiry(value),
        }
    }
}
