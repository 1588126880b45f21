//! Repository layer contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define CRUD data access contracts, one per entity kind.
//! - Isolate SQLite query details from lifecycle orchestration.
//! - Classify store failures into the semantic error taxonomy.
//!
//! # Invariants
//! - Write paths validate model shape before any SQL mutation.
//! - Read paths reject invalid persisted state instead of masking it.
//! - `get_*` on a well-formed absent id returns `Ok(None)`, never an error;
//!   update/delete on an absent id returns `NotFound`.
//! - Constraint violations (unique fields, foreign keys) surface as
//!   `Constraint`, classified from SQLite extended result codes.

use crate::db::{migrations, DbError};
use crate::model::{EntityKind, ValidationError};
use rusqlite::{ffi, Connection};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod session_repo;
pub mod task_repo;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Constraint classes reported by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    /// Duplicate value in a unique column (or duplicate primary key).
    Unique,
    /// Reference to a row that does not exist.
    ForeignKey,
    /// Any other constraint class (NOT NULL, CHECK, ...).
    Other,
}

impl ConstraintKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unique => "unique",
            Self::ForeignKey => "foreign_key",
            Self::Other => "other",
        }
    }
}

/// Repository error for entity persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    NotFound {
        kind: EntityKind,
        id: String,
    },
    Constraint {
        kind: ConstraintKind,
        detail: String,
    },
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl RepoError {
    /// Stable machine-readable code used in log events.
    ///
    /// Codes never carry record field values; the full message stays in the
    /// error itself.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Db(_) => "db",
            Self::NotFound { .. } => "not_found",
            Self::Constraint {
                kind: ConstraintKind::Unique,
                ..
            } => "constraint_unique",
            Self::Constraint {
                kind: ConstraintKind::ForeignKey,
                ..
            } => "constraint_foreign_key",
            Self::Constraint {
                kind: ConstraintKind::Other,
                ..
            } => "constraint_other",
            Self::InvalidData(_) => "invalid_data",
            Self::UninitializedConnection { .. } => "uninitialized_connection",
            Self::MissingRequiredTable(_) => "missing_table",
            Self::MissingRequiredColumn { .. } => "missing_column",
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::Constraint { kind, detail } => {
                write!(f, "{} constraint violated: {detail}", kind.as_str())
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection not migrated: schema version {actual_version}, expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table missing: {table}"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column missing: {table}.{column}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(code, message)
                if code.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                let kind = match code.extended_code {
                    ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                        ConstraintKind::Unique
                    }
                    ffi::SQLITE_CONSTRAINT_FOREIGNKEY => ConstraintKind::ForeignKey,
                    _ => ConstraintKind::Other,
                };
                Self::Constraint {
                    kind,
                    detail: message.unwrap_or_else(|| code.to_string()),
                }
            }
            other => Self::Db(DbError::Sqlite(other)),
        }
    }
}

/// Verifies a connection is migrated and exposes the given table shape.
///
/// Every repository constructor runs this so that CRUD calls never touch an
/// unmigrated or truncated database.
pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    table: &'static str,
    columns: &[&'static str],
) -> RepoResult<()> {
    let expected_version = migrations::latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, table)? {
        return Err(RepoError::MissingRequiredTable(table));
    }

    for &column in columns {
        if !table_has_column(conn, table, column)? {
            return Err(RepoError::MissingRequiredColumn { table, column });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
