//! Task lifecycle adapter.
//!
//! # Responsibility
//! - Drive the task scenario on top of a fixture user: create with default
//!   status/priority, patch the title, delete, confirm absence.
//!
//! # Invariants
//! - The fixture user exists before create and is purged with the tasks in
//!   one transaction during teardown.

use crate::model::task::{NewTask, Task, TaskPatch, TaskPriority, TaskStatus};
use crate::model::user::UserId;
use crate::model::EntityKind;
use crate::repo::task_repo::{SqliteTaskRepository, TaskRepository};
use crate::verify::fixtures::{create_fixture_user, purge_tasks_and_users};
use crate::verify::lifecycle::{ensure_eq, CheckError, LifecycleAdapter, LifecycleStep};
use rusqlite::Connection;

const CREATE_TITLE: &str = "Test Task";
const UPDATED_TITLE: &str = "Updated Task";

/// Drives one task lifecycle against a migrated connection.
pub struct TaskLifecycle<'conn> {
    conn: &'conn mut Connection,
    fixture_user_id: Option<UserId>,
    expected: Option<Task>,
}

impl<'conn> TaskLifecycle<'conn> {
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

    fn expected(&self, step: LifecycleStep) -> Result<&Task, CheckError> {
        self.expected
            .as_ref()
            .ok_or(CheckError::OutOfOrder { step })
    }
}

impl LifecycleAdapter for TaskLifecycle<'_> {
    fn kind(&self) -> EntityKind {
        EntityKind::Task
    }

    fn setup(&mut self) -> Result<(), CheckError> {
        let fixture = create_fixture_user(self.conn, EntityKind::Task.as_str())?;
        self.fixture_user_id = Some(fixture.id);
        Ok(())
    }

    fn create(&mut self) -> Result<String, CheckError> {
        let owner_id = self.owner_id(LifecycleStep::Create)?;
        let repo = SqliteTaskRepository::try_new(self.conn)?;
        let created = repo.create_task(&NewTask::new(CREATE_TITLE, owner_id))?;

        if created.id <= 0 {
            return Err(CheckError::Mismatch {
                field: "id",
                expected: "a positive store-assigned id".to_string(),
                actual: created.id.to_string(),
            });
        }
        ensure_eq("title", &CREATE_TITLE.to_string(), &created.title)?;
        ensure_eq("status", &TaskStatus::NotStarted, &created.status)?;
        ensure_eq("priority", &TaskPriority::Medium, &created.priority)?;
        ensure_eq("user_id", &owner_id, &created.user_id)?;

        let id = created.id.to_string();
        self.expected = Some(created);
        Ok(id)
    }

    fn read_back(&mut self) -> Result<(), CheckError> {
        let expected = self.expected(LifecycleStep::ReadBack)?.clone();
        let repo = SqliteTaskRepository::try_new(self.conn)?;
        let loaded = repo
            .get_task(expected.id)?
            .ok_or_else(|| CheckError::MissingRecord {
                id: expected.id.to_string(),
            })?;
        ensure_eq("record", &expected, &loaded)
    }

    fn update(&mut self) -> Result<(), CheckError> {
        let current = self.expected(LifecycleStep::Update)?.clone();
        let repo = SqliteTaskRepository::try_new(self.conn)?;

        let patch = TaskPatch {
            title: Some(UPDATED_TITLE.to_string()),
            ..TaskPatch::default()
        };
        let updated = repo.update_task(current.id, &patch)?;
        ensure_eq("title", &UPDATED_TITLE.to_string(), &updated.title)?;
        ensure_eq("description", &current.description, &updated.description)?;
        ensure_eq("due_date", &current.due_date, &updated.due_date)?;
        ensure_eq("status", &current.status, &updated.status)?;
        ensure_eq("priority", &current.priority, &updated.priority)?;
        ensure_eq("user_id", &current.user_id, &updated.user_id)?;
        ensure_eq("created_at", &current.created_at, &updated.created_at)?;

        let loaded = repo
            .get_task(current.id)?
            .ok_or_else(|| CheckError::MissingRecord {
                id: current.id.to_string(),
            })?;
        ensure_eq("record", &updated, &loaded)?;

        self.expected = Some(updated);
        Ok(())
    }

    fn delete(&mut self) -> Result<(), CheckError> {
        let id = self.expected(LifecycleStep::Delete)?.id;
        let repo = SqliteTaskRepository::try_new(self.conn)?;
        repo.delete_task(id)?;
        Ok(())
    }

    fn verify_gone(&mut self) -> Result<(), CheckError> {
        let id = self.expected(LifecycleStep::VerifyGone)?.id;
        let repo = SqliteTaskRepository::try_new(self.conn)?;
        if repo.get_task(id)?.is_some() {
            return Err(CheckError::ResidualRecord { id: id.to_string() });
        }
        Ok(())
    }

    fn teardown(&mut self) -> Result<(), CheckError> {
        purge_tasks_and_users(self.conn)?;
        Ok(())
    }
}
