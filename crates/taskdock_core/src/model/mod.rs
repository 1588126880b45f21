//! Domain models for the three persisted entity kinds.
//!
//! # Responsibility
//! - Define the canonical record, draft and patch shapes per entity kind.
//! - Provide shape validation shared by every write path.
//!
//! # Invariants
//! - Every record is identified by a stable id: store-assigned `i64` rowids
//!   for users/tasks, a caller-supplied string for sessions.
//! - Validation covers field shape only; uniqueness and referential
//!   integrity are enforced by the store.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

pub mod session;
pub mod task;
pub mod user;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Entity kinds handled by the persistence layer.
///
/// Used as the label in repository errors, lifecycle reports and log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    User,
    Task,
    Session,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Task => "task",
            Self::Session => "session",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape validation error shared by the three entity models.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    InvalidEmail(String),
    EmptyUsername,
    EmptyTitle,
    EmptySessionId,
    NonPositiveExpiry(i64),
    NonPositiveOwner(i64),
    EmptyPatch,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEmail(value) => write!(f, "invalid email address: `{value}`"),
            Self::EmptyUsername => write!(f, "username cannot be empty"),
            Self::EmptyTitle => write!(f, "task title cannot be empty"),
            Self::EmptySessionId => write!(f, "session id cannot be empty"),
            Self::NonPositiveExpiry(value) => {
                write!(f, "session expiry must be positive epoch ms, got {value}")
            }
            Self::NonPositiveOwner(value) => {
                write!(f, "owning user id must be positive, got {value}")
            }
            Self::EmptyPatch => write!(f, "patch contains no fields to apply"),
        }
    }
}

impl Error for ValidationError {}

/// Returns the current wall-clock time in unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

pub(crate) fn validate_email(value: &str) -> Result<(), ValidationError> {
    if EMAIL_RE.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail(value.to_string()))
    }
}

pub(crate) fn validate_username(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyUsername);
    }
    Ok(())
}

pub(crate) fn validate_title(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(())
}

pub(crate) fn validate_session_id(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptySessionId);
    }
    Ok(())
}

pub(crate) fn validate_expiry(value: i64) -> Result<(), ValidationError> {
    if value <= 0 {
        return Err(ValidationError::NonPositiveExpiry(value));
    }
    Ok(())
}

pub(crate) fn validate_owner(value: i64) -> Result<(), ValidationError> {
    if value <= 0 {
        return Err(ValidationError::NonPositiveOwner(value));
    }
    Ok(())
}
