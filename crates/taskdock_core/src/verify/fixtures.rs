//! Fixture users and teardown purges for owner-referencing lifecycles.
//!
//! # Responsibility
//! - Create the owning user a task/session scenario requires before create.
//! - Purge owned records and users together so foreign keys never block the
//!   cleanup.
//!
//! # Invariants
//! - Fixture users carry a distinctive `<kind>-fixture@taskdock.test`
//!   address, so leaked fixtures are recognizable in a store dump.
//! - Purges delete owned rows before users, in one immediate transaction;
//!   a partial purge never commits.

use crate::model::user::{NewUser, User};
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::verify::lifecycle::CheckError;
use log::info;
use rusqlite::{Connection, TransactionBehavior};

const FIXTURE_EMAIL_DOMAIN: &str = "taskdock.test";

/// Row counts removed by a teardown purge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurgeCounts {
    /// Rows removed from the owned kind's table.
    pub owned: usize,
    /// Rows removed from `users`, fixtures included.
    pub users: usize,
}

/// Creates the owning user for a dependent entity's scenario.
///
/// The label (usually the dependent kind's name) lands in both the email
/// and the username, keeping fixtures distinguishable per kind.
pub fn create_fixture_user(conn: &Connection, label: &str) -> Result<User, CheckError> {
    let draft = NewUser::new(
        format!("{label}-fixture@{FIXTURE_EMAIL_DOMAIN}"),
        format!("{label}_fixture"),
    );
    let repo = SqliteUserRepository::try_new(conn)?;
    let user = repo.create_user(&draft)?;
    info!(
        "event=fixture_user module=verify status=ok for={label} user_id={}",
        user.id
    );
    Ok(user)
}

/// Removes every task, then every user, in one transaction.
pub fn purge_tasks_and_users(conn: &mut Connection) -> Result<PurgeCounts, CheckError> {
    purge_owned_then_users(conn, "tasks")
}

/// Removes every session, then every user, in one transaction.
pub fn purge_sessions_and_users(conn: &mut Connection) -> Result<PurgeCounts, CheckError> {
    purge_owned_then_users(conn, "sessions")
}

fn purge_owned_then_users(
    conn: &mut Connection,
    owned_table: &'static str,
) -> Result<PurgeCounts, CheckError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let owned = tx.execute(&format!("DELETE FROM {owned_table};"), [])?;
    let users = tx.execute("DELETE FROM users;", [])?;
    tx.commit()?;

    info!(
        "event=lifecycle_purge module=verify status=ok owned_table={owned_table} owned={owned} users={users}"
    );
    Ok(PurgeCounts { owned, users })
}
