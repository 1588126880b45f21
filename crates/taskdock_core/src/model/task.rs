//! Task domain model.
//!
//! # Responsibility
//! - Define the persisted task record plus its draft and patch shapes.
//! - Map lifecycle status and priority to stable wire names.
//!
//! # Invariants
//! - Every task references exactly one owning user; the reference is
//!   enforced by the store's foreign key, not by this model.
//! - `status`/`priority` wire names are snake_case and never change.

use super::user::UserId;
use super::{validate_owner, validate_title, ValidationError};
use serde::{Deserialize, Serialize};

/// Store-assigned stable identifier for tasks.
pub type TaskId = i64;

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Created but not started.
    #[default]
    NotStarted,
    /// Work is in progress.
    InProgress,
    /// Completed successfully.
    Done,
    /// No longer actionable.
    Cancelled,
}

impl TaskStatus {
    /// Stable db/wire name; must agree with the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Done => "done",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "not_started" => Some(Self::NotStarted),
            "in_progress" => Some(Self::InProgress),
            "done" => Some(Self::Done),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Task urgency level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    /// Stable db/wire name; must agree with the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// Persisted task record as returned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    /// Unix epoch milliseconds.
    pub due_date: Option<i64>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    /// Owning user; must reference an existing `users` row.
    pub user_id: UserId,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Task {
    /// Checks persisted field shape; read paths reject rows failing this.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_title(&self.title)?;
        validate_owner(self.user_id)?;
        Ok(())
    }
}

/// Creation draft; the store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<i64>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub user_id: UserId,
}

impl NewTask {
    /// Creates a draft with default status (`not_started`) and priority
    /// (`medium`).
    pub fn new(title: impl Into<String>, user_id: UserId) -> Self {
        Self {
            title: title.into(),
            description: None,
            due_date: None,
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            user_id,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_title(&self.title)?;
        validate_owner(self.user_id)?;
        Ok(())
    }
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<i64>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.status.is_none()
            && self.priority.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::EmptyPatch);
        }
        if let Some(title) = self.title.as_deref() {
            validate_title(title)?;
        }
        Ok(())
    }
}
