//! Persistence lifecycle verifier.
//!
//! # Responsibility
//! - Drive one create→read→update→delete pass per entity kind and check
//!   every store response against the expected state transition.
//! - Keep the four generic CRUD checks in one parameterized routine; the
//!   per-kind adapters only supply typed scenario data.
//!
//! # Invariants
//! - Steps within one lifecycle run strictly in order; each depends on the
//!   id produced by create.
//! - Teardown always runs, whether or not an earlier step failed.
//! - A failing kind aborts only its own lifecycle; later kinds still run.

use crate::model::EntityKind;
use log::info;
use rusqlite::Connection;

pub mod fixtures;
pub mod lifecycle;
pub mod session_lifecycle;
pub mod task_lifecycle;
pub mod user_lifecycle;

pub use fixtures::{
    create_fixture_user, purge_sessions_and_users, purge_tasks_and_users, PurgeCounts,
};
pub use lifecycle::{
    run_lifecycle, CheckError, LifecycleAdapter, LifecycleFailure, LifecycleReport, LifecycleStep,
    TeardownOutcome,
};
pub use session_lifecycle::SessionLifecycle;
pub use task_lifecycle::TaskLifecycle;
pub use user_lifecycle::UserLifecycle;

/// Result of one entity kind's lifecycle pass.
#[derive(Debug)]
pub struct LifecycleOutcome {
    pub kind: EntityKind,
    pub result: Result<LifecycleReport, LifecycleFailure>,
}

/// Aggregate result of a full store verification run.
#[derive(Debug)]
pub struct StoreVerdict {
    /// One outcome per entity kind, in execution order.
    pub outcomes: Vec<LifecycleOutcome>,
}

impl StoreVerdict {
    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(|outcome| outcome.result.is_ok())
    }
}

/// Runs the three entity lifecycles (user, task, session) sequentially
/// against one store connection.
///
/// The connection stays usable afterwards; callers own its release.
pub fn verify_store(conn: &mut Connection) -> StoreVerdict {
    let mut outcomes = Vec::new();

    {
        let mut adapter = UserLifecycle::new(conn);
        outcomes.push(outcome_of(run_lifecycle(&mut adapter)));
    }
    {
        let mut adapter = TaskLifecycle::new(conn);
        outcomes.push(outcome_of(run_lifecycle(&mut adapter)));
    }
    {
        let mut adapter = SessionLifecycle::new(conn);
        outcomes.push(outcome_of(run_lifecycle(&mut adapter)));
    }

    let verdict = StoreVerdict { outcomes };
    info!(
        "event=verify_store module=verify status={} kinds={}",
        if verdict.passed() { "ok" } else { "error" },
        verdict.outcomes.len()
    );
    verdict
}

fn outcome_of(result: Result<LifecycleReport, LifecycleFailure>) -> LifecycleOutcome {
    let kind = match &result {
        Ok(report) => report.kind,
        Err(failure) => failure.kind,
    };
    LifecycleOutcome { kind, result }
}
