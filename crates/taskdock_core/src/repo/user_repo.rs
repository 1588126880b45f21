//! User repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over the `users` table.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths validate drafts/patches before SQL mutations.
//! - `email` uniqueness is enforced by the store and surfaces as
//!   `Constraint { kind: Unique }`.

use crate::model::user::{NewUser, User, UserId, UserPatch};
use crate::model::EntityKind;
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const USER_SELECT_SQL: &str = "SELECT
    id,
    email,
    username,
    created_at,
    updated_at
FROM users";

const USER_COLUMNS: &[&str] = &["id", "email", "username", "created_at", "updated_at"];

/// Repository interface for user CRUD operations.
pub trait UserRepository {
    /// Persists a draft and returns the stored record, id included.
    fn create_user(&self, draft: &NewUser) -> RepoResult<User>;
    /// Looks a user up by id; absence is `Ok(None)`.
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    /// Applies a partial update and returns the full updated record.
    fn update_user(&self, id: UserId, patch: &UserPatch) -> RepoResult<User>;
    /// Removes one user; `NotFound` when the id does not exist.
    fn delete_user(&self, id: UserId) -> RepoResult<()>;
    /// Lists all users ordered by id.
    fn list_users(&self) -> RepoResult<Vec<User>>;
    /// Removes every user, returning the removed-row count.
    fn delete_all_users(&self) -> RepoResult<usize>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "users", USER_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, draft: &NewUser) -> RepoResult<User> {
        draft.validate()?;

        self.conn.execute(
            "INSERT INTO users (email, username) VALUES (?1, ?2);",
            params![draft.email.as_str(), draft.username.as_str()],
        )?;

        let id = self.conn.last_insert_rowid();
        self.get_user(id)?.ok_or_else(|| missing_after_write(id))
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }

        Ok(None)
    }

    fn update_user(&self, id: UserId, patch: &UserPatch) -> RepoResult<User> {
        patch.validate()?;

        let mut sql = String::from("UPDATE users SET updated_at = (strftime('%s', 'now') * 1000)");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(email) = patch.email.as_ref() {
            sql.push_str(", email = ?");
            bind_values.push(Value::Text(email.clone()));
        }
        if let Some(username) = patch.username.as_ref() {
            sql.push_str(", username = ?");
            bind_values.push(Value::Text(username.clone()));
        }

        sql.push_str(" WHERE id = ?;");
        bind_values.push(Value::Integer(id));

        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        if changed == 0 {
            return Err(not_found(id));
        }

        self.get_user(id)?.ok_or_else(|| missing_after_write(id))
    }

    fn delete_user(&self, id: UserId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM users WHERE id = ?1;", params![id])?;

        if changed == 0 {
            return Err(not_found(id));
        }

        Ok(())
    }

    fn list_users(&self) -> RepoResult<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} ORDER BY id ASC;"))?;

        let mut rows = stmt.query([])?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }

        Ok(users)
    }

    fn delete_all_users(&self) -> RepoResult<usize> {
        let changed = self.conn.execute("DELETE FROM users;", [])?;
        Ok(changed)
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let user = User {
        id: row.get("id")?,
        email: row.get("email")?,
        username: row.get("username")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    user.validate()
        .map_err(|err| RepoError::InvalidData(format!("users row {}: {err}", user.id)))?;
    Ok(user)
}

fn not_found(id: UserId) -> RepoError {
    RepoError::NotFound {
        kind: EntityKind::User,
        id: id.to_string(),
    }
}

fn missing_after_write(id: UserId) -> RepoError {
    RepoError::InvalidData(format!("user {id} missing on post-write read-back"))
}
