//! Parameterized lifecycle runner and its error taxonomy.
//!
//! # Responsibility
//! - Execute the create→read→update→delete checks in one generic routine.
//! - Report which steps completed, which one failed, and what became of the
//!   always-attempted teardown.
//!
//! # Invariants
//! - Steps run strictly in `LifecycleStep::ALL` order; the first failure
//!   stops the main sequence.
//! - Teardown runs exactly once per lifecycle, after success and after
//!   failure alike.
//! - Log events carry ids, step names, counts and error codes only; record
//!   field values stay out of log lines.

use crate::model::EntityKind;
use crate::repo::RepoError;
use log::{error, info};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::time::Instant;

/// One step of an entity lifecycle, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleStep {
    /// Creates referenced fixtures (an owning user, where required).
    Setup,
    /// Persists the scenario record and captures its id.
    Create,
    /// Re-reads the record by id and compares it field by field.
    ReadBack,
    /// Applies a one-field patch, then re-reads to confirm it stuck.
    Update,
    /// Removes the record by id.
    Delete,
    /// Confirms a read by the deleted id yields nothing.
    VerifyGone,
    /// Purges every record of the kind plus any fixtures.
    Teardown,
}

/// The steps `run_lifecycle` drives before the teardown phase.
const MAIN_STEPS: [LifecycleStep; 6] = [
    LifecycleStep::Setup,
    LifecycleStep::Create,
    LifecycleStep::ReadBack,
    LifecycleStep::Update,
    LifecycleStep::Delete,
    LifecycleStep::VerifyGone,
];

impl LifecycleStep {
    /// Every step in execution order, teardown last.
    pub const ALL: [LifecycleStep; 7] = [
        Self::Setup,
        Self::Create,
        Self::ReadBack,
        Self::Update,
        Self::Delete,
        Self::VerifyGone,
        Self::Teardown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Create => "create",
            Self::ReadBack => "read_back",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::VerifyGone => "verify_gone",
            Self::Teardown => "teardown",
        }
    }
}

impl Display for LifecycleStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure raised by a lifecycle step check.
#[derive(Debug)]
pub enum CheckError {
    /// Repository operation failed underneath the check.
    Repo(RepoError),
    /// Read-back found nothing where a record must exist.
    MissingRecord { id: String },
    /// Read-back still found a record after its deletion.
    ResidualRecord { id: String },
    /// A field did not hold the expected value.
    Mismatch {
        field: &'static str,
        expected: String,
        actual: String,
    },
    /// A step was invoked before the step that produces its input state.
    OutOfOrder { step: LifecycleStep },
}

impl CheckError {
    /// Stable machine-readable code used in log events.
    ///
    /// Codes never carry record field values; the full message stays in the
    /// error itself.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Repo(err) => err.error_code(),
            Self::MissingRecord { .. } => "missing_record",
            Self::ResidualRecord { .. } => "residual_record",
            Self::Mismatch { .. } => "mismatch",
            Self::OutOfOrder { .. } => "out_of_order",
        }
    }
}

impl Display for CheckError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::MissingRecord { id } => write!(f, "record {id} not found on read-back"),
            Self::ResidualRecord { id } => write!(f, "record {id} still present after delete"),
            Self::Mismatch {
                field,
                expected,
                actual,
            } => write!(f, "field `{field}` mismatch: expected {expected}, got {actual}"),
            Self::OutOfOrder { step } => {
                write!(f, "step {step} invoked before its prerequisite state exists")
            }
        }
    }
}

impl Error for CheckError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for CheckError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<rusqlite::Error> for CheckError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(RepoError::from(value))
    }
}

/// Compares one field of a read-back record against its expected value.
pub(crate) fn ensure_eq<T>(field: &'static str, expected: &T, actual: &T) -> Result<(), CheckError>
where
    T: PartialEq + Debug,
{
    if expected == actual {
        Ok(())
    } else {
        Err(CheckError::Mismatch {
            field,
            expected: format!("{expected:?}"),
            actual: format!("{actual:?}"),
        })
    }
}

/// Scenario hooks for one entity kind.
///
/// Adapters own the typed state a scenario accumulates (the created record,
/// the expected values after a patch); `run_lifecycle` owns sequencing,
/// logging and reporting. Implementations may assume the runner's step
/// order and should answer an out-of-order invocation with
/// [`CheckError::OutOfOrder`] rather than panicking.
pub trait LifecycleAdapter {
    /// Entity kind this adapter exercises.
    fn kind(&self) -> EntityKind;
    /// Creates referenced fixtures; a no-op for kinds without owners.
    fn setup(&mut self) -> Result<(), CheckError>;
    /// Persists the scenario record and returns its id in display form.
    fn create(&mut self) -> Result<String, CheckError>;
    /// Re-reads the created record and compares it against expectations.
    fn read_back(&mut self) -> Result<(), CheckError>;
    /// Applies the scenario patch and confirms it via a fresh read.
    fn update(&mut self) -> Result<(), CheckError>;
    /// Removes the record.
    fn delete(&mut self) -> Result<(), CheckError>;
    /// Confirms the deleted id now reads back as absent.
    fn verify_gone(&mut self) -> Result<(), CheckError>;
    /// Purges records of this kind plus any fixtures; must tolerate being
    /// called after a failed step.
    fn teardown(&mut self) -> Result<(), CheckError>;
}

/// Successful lifecycle pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleReport {
    pub kind: EntityKind,
    /// Display form of the id produced by the create step.
    pub entity_id: Option<String>,
    /// Steps completed, in execution order; teardown included.
    pub steps: Vec<LifecycleStep>,
}

/// What the always-attempted teardown did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeardownOutcome {
    /// Teardown ran to completion.
    Clean,
    /// Teardown itself failed; the rendered error is kept for reporting.
    Failed(String),
}

impl TeardownOutcome {
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::Clean)
    }
}

/// Failed lifecycle pass.
///
/// `step` names where the sequence stopped; `teardown` records the cleanup
/// attempt that still followed. A teardown error after an otherwise clean
/// run is reported with `step == Teardown`.
#[derive(Debug)]
pub struct LifecycleFailure {
    pub kind: EntityKind,
    pub step: LifecycleStep,
    pub cause: CheckError,
    pub teardown: TeardownOutcome,
}

impl Display for LifecycleFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} lifecycle failed at step {}: {}",
            self.kind, self.step, self.cause
        )
    }
}

impl Error for LifecycleFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.cause)
    }
}

/// Drives one full lifecycle through the adapter.
///
/// Executes setup→create→read_back→update→delete→verify_gone strictly in
/// order, stopping at the first failure, then always attempts teardown.
///
/// # Side effects
/// - Emits `lifecycle_start`, `lifecycle_step` and `lifecycle_done` log
///   events carrying kind, step, status, error code and duration only.
pub fn run_lifecycle<A>(adapter: &mut A) -> Result<LifecycleReport, LifecycleFailure>
where
    A: LifecycleAdapter + ?Sized,
{
    let kind = adapter.kind();
    let started_at = Instant::now();
    info!("event=lifecycle_start module=verify kind={kind}");

    let mut completed = Vec::new();
    let mut entity_id: Option<String> = None;
    let mut failed: Option<(LifecycleStep, CheckError)> = None;

    for step in MAIN_STEPS {
        match dispatch(adapter, step, &mut entity_id) {
            Ok(()) => {
                info!("event=lifecycle_step module=verify kind={kind} step={step} status=ok");
                completed.push(step);
            }
            Err(err) => {
                error!(
                    "event=lifecycle_step module=verify kind={kind} step={step} status=error error_code={}",
                    err.error_code()
                );
                failed = Some((step, err));
                break;
            }
        }
    }

    let teardown_result = dispatch(adapter, LifecycleStep::Teardown, &mut entity_id);
    match &teardown_result {
        Ok(()) => {
            info!("event=lifecycle_step module=verify kind={kind} step=teardown status=ok");
        }
        Err(err) => {
            error!(
                "event=lifecycle_step module=verify kind={kind} step=teardown status=error error_code={}",
                err.error_code()
            );
        }
    }

    let duration_ms = started_at.elapsed().as_millis();
    match (failed, teardown_result) {
        (None, Ok(())) => {
            completed.push(LifecycleStep::Teardown);
            info!(
                "event=lifecycle_done module=verify kind={kind} status=ok steps={} duration_ms={duration_ms}",
                completed.len()
            );
            Ok(LifecycleReport {
                kind,
                entity_id,
                steps: completed,
            })
        }
        (None, Err(cause)) => {
            error!(
                "event=lifecycle_done module=verify kind={kind} status=error failed_step=teardown duration_ms={duration_ms}"
            );
            let teardown = TeardownOutcome::Failed(cause.to_string());
            Err(LifecycleFailure {
                kind,
                step: LifecycleStep::Teardown,
                cause,
                teardown,
            })
        }
        (Some((step, cause)), teardown_result) => {
            error!(
                "event=lifecycle_done module=verify kind={kind} status=error failed_step={step} duration_ms={duration_ms}"
            );
            let teardown = match teardown_result {
                Ok(()) => TeardownOutcome::Clean,
                Err(err) => TeardownOutcome::Failed(err.to_string()),
            };
            Err(LifecycleFailure {
                kind,
                step,
                cause,
                teardown,
            })
        }
    }
}

fn dispatch<A>(
    adapter: &mut A,
    step: LifecycleStep,
    entity_id: &mut Option<String>,
) -> Result<(), CheckError>
where
    A: LifecycleAdapter + ?Sized,
{
    match step {
        LifecycleStep::Setup => adapter.setup(),
        LifecycleStep::Create => adapter.create().map(|id| *entity_id = Some(id)),
        LifecycleStep::ReadBack => adapter.read_back(),
        LifecycleStep::Update => adapter.update(),
        LifecycleStep::Delete => adapter.delete(),
        LifecycleStep::VerifyGone => adapter.verify_gone(),
        LifecycleStep::Teardown => adapter.teardown(),
    }
}
