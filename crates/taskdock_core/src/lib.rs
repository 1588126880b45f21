//! Core persistence verification logic for TaskDock.
//! This crate is the single source of truth for entity lifecycle invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod verify;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::session::{NewSession, Session, SessionId, SessionPatch};
pub use model::task::{NewTask, Task, TaskId, TaskPatch, TaskPriority, TaskStatus};
pub use model::user::{NewUser, User, UserId, UserPatch};
pub use model::{now_epoch_ms, EntityKind, ValidationError};
pub use repo::session_repo::{SessionRepository, SqliteSessionRepository};
pub use repo::task_repo::{SqliteTaskRepository, TaskRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{ConstraintKind, RepoError, RepoResult};
pub use verify::{
    run_lifecycle, verify_store, CheckError, LifecycleAdapter, LifecycleFailure, LifecycleOutcome,
    LifecycleReport, LifecycleStep, SessionLifecycle, StoreVerdict, TaskLifecycle, TeardownOutcome,
    UserLifecycle,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
