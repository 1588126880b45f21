//! User lifecycle adapter.
//!
//! # Responsibility
//! - Drive the user scenario: create a known address, patch the email,
//!   delete, and confirm the store forgets the record.
//!
//! # Invariants
//! - The store assigns the id; the adapter only holds it back as a locator.
//! - Teardown removes every user row, not only the scenario record.

use crate::model::user::{NewUser, User, UserPatch};
use crate::model::EntityKind;
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::verify::lifecycle::{ensure_eq, CheckError, LifecycleAdapter, LifecycleStep};
use rusqlite::Connection;

const CREATE_EMAIL: &str = "test@example.com";
const CREATE_USERNAME: &str = "testuser";
const UPDATED_EMAIL: &str = "updated@example.com";

/// Drives one user lifecycle against a migrated connection.
pub struct UserLifecycle<'conn> {
    conn: &'conn Connection,
    expected: Option<User>,
}

impl<'conn> UserLifecycle<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            expected: None,
        }
    }

    fn expected(&self, step: LifecycleStep) -> Result<&User, CheckError> {
        self.expected
            .as_ref()
            .ok_or(CheckError::OutOfOrder { step })
    }
}

impl LifecycleAdapter for UserLifecycle<'_> {
    fn kind(&self) -> EntityKind {
        EntityKind::User
    }

    fn setup(&mut self) -> Result<(), CheckError> {
        // Users reference nothing; there is no fixture to prepare.
        Ok(())
    }

    fn create(&mut self) -> Result<String, CheckError> {
        let repo = SqliteUserRepository::try_new(self.conn)?;
        let created = repo.create_user(&NewUser::new(CREATE_EMAIL, CREATE_USERNAME))?;

        if created.id <= 0 {
            return Err(CheckError::Mismatch {
                field: "id",
                expected: "a positive store-assigned id".to_string(),
                actual: created.id.to_string(),
            });
        }
        ensure_eq("email", &CREATE_EMAIL.to_string(), &created.email)?;
        ensure_eq("username", &CREATE_USERNAME.to_string(), &created.username)?;

        let id = created.id.to_string();
        self.expected = Some(created);
        Ok(id)
    }

    fn read_back(&mut self) -> Result<(), CheckError> {
        let expected = self.expected(LifecycleStep::ReadBack)?.clone();
        let repo = SqliteUserRepository::try_new(self.conn)?;
        let loaded = repo
            .get_user(expected.id)?
            .ok_or_else(|| CheckError::MissingRecord {
                id: expected.id.to_string(),
            })?;
        ensure_eq("record", &expected, &loaded)
    }

    fn update(&mut self) -> Result<(), CheckError> {
        let current = self.expected(LifecycleStep::Update)?.clone();
        let repo = SqliteUserRepository::try_new(self.conn)?;

        let patch = UserPatch {
            email: Some(UPDATED_EMAIL.to_string()),
            username: None,
        };
        let updated = repo.update_user(current.id, &patch)?;
        ensure_eq("email", &UPDATED_EMAIL.to_string(), &updated.email)?;
        ensure_eq("username", &current.username, &updated.username)?;
        ensure_eq("created_at", &current.created_at, &updated.created_at)?;

        let loaded = repo
            .get_user(current.id)?
            .ok_or_else(|| CheckError::MissingRecord {
                id: current.id.to_string(),
            })?;
        ensure_eq("record", &updated, &loaded)?;

        self.expected = Some(updated);
        Ok(())
    }

    fn delete(&mut self) -> Result<(), CheckError> {
        let id = self.expected(LifecycleStep::Delete)?.id;
        let repo = SqliteUserRepository::try_new(self.conn)?;
        repo.delete_user(id)?;
        Ok(())
    }

    fn verify_gone(&mut self) -> Result<(), CheckError> {
        let id = self.expected(LifecycleStep::VerifyGone)?.id;
        let repo = SqliteUserRepository::try_new(self.conn)?;
        if repo.get_user(id)?.is_some() {
            return Err(CheckError::ResidualRecord { id: id.to_string() });
        }
        Ok(())
    }

    fn teardown(&mut self) -> Result<(), CheckError> {
        let repo = SqliteUserRepository::try_new(self.conn)?;
        repo.delete_all_users()?;
        Ok(())
    }
}
