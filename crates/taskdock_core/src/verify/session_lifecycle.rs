//! Session lifecycle adapter.
//!
//! # Responsibility
//! - Drive the session scenario on top of a fixture user: create under the
//!   caller-chosen id, extend the expiry, delete, confirm absence.
//!
//! # Invariants
//! - The scenario id is `session1`, exercising the caller-supplied-id path
//!   rather than the generated-token path.
//! - Expiry timestamps are taken relative to the wall clock at each step.

use crate::model::session::{NewSession, Session, SessionPatch};
use crate::model::user::UserId;
use crate::model::{now_epoch_ms, EntityKind};
use crate::repo::session_repo::{SessionRepository, SqliteSessionRepository};
use crate::verify::fixtures::{create_fixture_user, purge_sessions_and_users};
use crate::verify::lifecycle::{ensure_eq, CheckError, LifecycleAdapter, LifecycleStep};
use rusqlite::Connection;

const SESSION_ID: &str = "session1";
/// One hour, in milliseconds.
const INITIAL_TTL_MS: i64 = 3_600_000;
/// Two hours, in milliseconds.
const EXTENDED_TTL_MS: i64 = 7_200_000;

/// Drives one session lifecycle against a migrated connection.
pub struct SessionLifecycle<'conn> {
    conn: &'conn mut Connection,
    fixture_user_id: Option<UserId>,
    expected: Option<Session>,
}

impl<'conn> SessionLifecycle<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self {
            conn,
            fixture_user_id: None,
            expected: None,
        }
    }

    fn owner_id(&self, step: LifecycleStep) -> Result<UserId, CheckError> {
        self.fixture_user_id.ok_or(CheckError::OutOfOrder { step })
    }

    fn expected(&self, step: LifecycleStep) -> Result<&Session, CheckError> {
        self.expected
            .as_ref()
            .ok_or(CheckError::OutOfOrder { step })
    }
}

impl LifecycleAdapter for SessionLifecycle<'_> {
    fn kind(&self) -> EntityKind {
        EntityKind::Session
    }

    fn setup(&mut self) -> Result<(), CheckError> {
        let fixture = create_fixture_user(self.conn, EntityKind::Session.as_str())?;
        self.fixture_user_id = Some(fixture.id);
        Ok(())
    }

    fn create(&mut self) -> Result<String, CheckError> {
        let owner_id = self.owner_id(LifecycleStep::Create)?;
        let expires_at = now_epoch_ms() + INITIAL_TTL_MS;
        let repo = SqliteSessionRepository::try_new(self.conn)?;
        let created = repo.create_session(&NewSession::with_id(SESSION_ID, owner_id, expires_at))?;

        ensure_eq("id", &SESSION_ID.to_string(), &created.id)?;
        ensure_eq("user_id", &owner_id, &created.user_id)?;
        ensure_eq("expires_at", &expires_at, &created.expires_at)?;

        self.expected = Some(created);
        Ok(SESSION_ID.to_string())
    }

    fn read_back(&mut self) -> Result<(), CheckError> {
        let expected = self.expected(LifecycleStep::ReadBack)?.clone();
        let repo = SqliteSessionRepository::try_new(self.conn)?;
        let loaded = repo
            .get_session(&expected.id)?
            .ok_or_else(|| CheckError::MissingRecord {
                id: expected.id.clone(),
            })?;
        ensure_eq("user_id", &expected.user_id, &loaded.user_id)?;
        ensure_eq("record", &expected, &loaded)
    }

    fn update(&mut self) -> Result<(), CheckError> {
        let current = self.expected(LifecycleStep::Update)?.clone();
        let extended = now_epoch_ms() + EXTENDED_TTL_MS;
        let repo = SqliteSessionRepository::try_new(self.conn)?;

        let patch = SessionPatch {
            expires_at: Some(extended),
        };
        let updated = repo.update_session(&current.id, &patch)?;
        ensure_eq("expires_at", &extended, &updated.expires_at)?;
        ensure_eq("user_id", &current.user_id, &updated.user_id)?;
        ensure_eq("created_at", &current.created_at, &updated.created_at)?;

        let loaded = repo
            .get_session(&current.id)?
            .ok_or_else(|| CheckError::MissingRecord {
                id: current.id.clone(),
            })?;
        ensure_eq("record", &updated, &loaded)?;

        self.expected = Some(updated);
        Ok(())
    }

    fn delete(&mut self) -> Result<(), CheckError> {
        let id = self.expected(LifecycleStep::Delete)?.id.clone();
        let repo = SqliteSessionRepository::try_new(self.conn)?;
        repo.delete_session(&id)?;
        Ok(())
    }

    fn verify_gone(&mut self) -> Result<(), CheckError> {
        let id = self.expected(LifecycleStep::VerifyGone)?.id.clone();
        let repo = SqliteSessionRepository::try_new(self.conn)?;
        if repo.get_session(&id)?.is_some() {
            return Err(CheckError::ResidualRecord { id });
        }
        Ok(())
    }

    fn teardown(&mut self) -> Result<(), CheckError> {
        purge_sessions_and_users(self.conn)?;
        Ok(())
    }
}
