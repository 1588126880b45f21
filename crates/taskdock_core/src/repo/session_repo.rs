//! Session repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over the `sessions` table.
//!
//! # Invariants
//! - The session id is caller-chosen; inserting a duplicate surfaces as
//!   `Constraint { kind: Unique }` (primary key), never silent replacement.
//! - The owning-user reference is enforced by the store's foreign key.

use crate::model::session::{NewSession, Session, SessionPatch};
use crate::model::EntityKind;
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const SESSION_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    expires_at,
    created_at,
    updated_at
FROM sessions";

const SESSION_COLUMNS: &[&str] = &["id", "user_id", "expires_at", "created_at", "updated_at"];

/// Repository interface for session CRUD operations.
pub trait SessionRepository {
    /// Persists a draft under its caller-supplied id and returns the
    /// stored record.
    fn create_session(&self, draft: &NewSession) -> RepoResult<Session>;
    /// Looks a session up by id; absence is `Ok(None)`.
    fn get_session(&self, id: &str) -> RepoResult<Option<Session>>;
    /// Applies a partial update and returns the full updated record.
    fn update_session(&self, id: &str, patch: &SessionPatch) -> RepoResult<Session>;
    /// Removes one session; `NotFound` when the id does not exist.
    fn delete_session(&self, id: &str) -> RepoResult<()>;
    /// Lists all sessions in creation order.
    fn list_sessions(&self) -> RepoResult<Vec<Session>>;
    /// Removes every session, returning the removed-row count.
    fn delete_all_sessions(&self) -> RepoResult<usize>;
}

/// SQLite-backed session repository.
pub struct SqliteSessionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSessionRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "sessions", SESSION_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl SessionRepository for SqliteSessionRepository<'_> {
    fn create_session(&self, draft: &NewSession) -> RepoResult<Session> {
        draft.validate()?;

        self.conn.execute(
            "INSERT INTO sessions (id, user_id, expires_at) VALUES (?1, ?2, ?3);",
            params![draft.id.as_str(), draft.user_id, draft.expires_at],
        )?;

        self.get_session(&draft.id)?
            .ok_or_else(|| missing_after_write(&draft.id))
    }

    fn get_session(&self, id: &str) -> RepoResult<Option<Session>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SESSION_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_session_row(row)?));
        }

        Ok(None)
    }

    fn update_session(&self, id: &str, patch: &SessionPatch) -> RepoResult<Session> {
        patch.validate()?;

        // SessionPatch carries exactly one settable field, so the SET
        // clause is static, unlike the user/task repositories.
        let changed = self.conn.execute(
            "UPDATE sessions
             SET
                expires_at = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?2;",
            params![patch.expires_at, id],
        )?;

        if changed == 0 {
            return Err(not_found(id));
        }

        self.get_session(id)?.ok_or_else(|| missing_after_write(id))
    }

    fn delete_session(&self, id: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM sessions WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(not_found(id));
        }

        Ok(())
    }

    fn list_sessions(&self) -> RepoResult<Vec<Session>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SESSION_SELECT_SQL} ORDER BY created_at ASC, id ASC;"))?;

        let mut rows = stmt.query([])?;
        let mut sessions = Vec::new();
        while let Some(row) = rows.next()? {
            sessions.push(parse_session_row(row)?);
        }

        Ok(sessions)
    }

    fn delete_all_sessions(&self) -> RepoResult<usize> {
        let changed = self.conn.execute("DELETE FROM sessions;", [])?;
        Ok(changed)
    }
}

fn parse_session_row(row: &Row<'_>) -> RepoResult<Session> {
    let session = Session {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        expires_at: row.get("expires_at")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    session
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("sessions row {}: {err}", session.id)))?;
    Ok(session)
}

fn not_found(id: &str) -> RepoError {
    RepoError::NotFound {
        kind: EntityKind::Session,
        id: id.to_string(),
    }
}

fn missing_after_write(id: &str) -> RepoError {
    RepoError::InvalidData(format!("session `{id}` missing on post-write read-back"))
}
