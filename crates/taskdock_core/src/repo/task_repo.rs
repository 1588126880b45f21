//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over the `tasks` table.
//! - Map status/priority enums to their stable db names.
//!
//! # Invariants
//! - Write paths validate drafts/patches before SQL mutations.
//! - The owning-user reference is enforced by the store's foreign key and
//!   surfaces as `Constraint { kind: ForeignKey }` on violation.

use crate::model::task::{NewTask, Task, TaskId, TaskPatch, TaskPriority, TaskStatus};
use crate::model::EntityKind;
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const TASK_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    due_date,
    status,
    priority,
    user_id,
    created_at,
    updated_at
FROM tasks";

const TASK_COLUMNS: &[&str] = &[
    "id",
    "title",
    "description",
    "due_date",
    "status",
    "priority",
    "user_id",
    "created_at",
    "updated_at",
];

/// Repository interface for task CRUD operations.
pub trait TaskRepository {
    /// Persists a draft and returns the stored record, id included.
    fn create_task(&self, draft: &NewTask) -> RepoResult<Task>;
    /// Looks a task up by id; absence is `Ok(None)`.
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    /// Applies a partial update and returns the full updated record.
    fn update_task(&self, id: TaskId, patch: &TaskPatch) -> RepoResult<Task>;
    /// Removes one task; `NotFound` when the id does not exist.
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
    /// Lists all tasks ordered by id.
    fn list_tasks(&self) -> RepoResult<Vec<Task>>;
    /// Removes every task, returning the removed-row count.
    fn delete_all_tasks(&self) -> RepoResult<usize>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "tasks", TASK_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, draft: &NewTask) -> RepoResult<Task> {
        draft.validate()?;

        self.conn.execute(
            "INSERT INTO tasks (title, description, due_date, status, priority, user_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                draft.title.as_str(),
                draft.description.as_deref(),
                draft.due_date,
                draft.status.as_str(),
                draft.priority.as_str(),
                draft.user_id,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        self.get_task(id)?.ok_or_else(|| missing_after_write(id))
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }

        Ok(None)
    }

    fn update_task(&self, id: TaskId, patch: &TaskPatch) -> RepoResult<Task> {
        patch.validate()?;

        let mut sql = String::from("UPDATE tasks SET updated_at = (strftime('%s', 'now') * 1000)");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(title) = patch.title.as_ref() {
            sql.push_str(", title = ?");
            bind_values.push(Value::Text(title.clone()));
        }
        if let Some(description) = patch.description.as_ref() {
            sql.push_str(", description = ?");
            bind_values.push(Value::Text(description.clone()));
        }
        if let Some(due_date) = patch.due_date {
            sql.push_str(", due_date = ?");
            bind_values.push(Value::Integer(due_date));
        }
        if let Some(status) = patch.status {
            sql.push_str(", status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }
        if let Some(priority) = patch.priority {
            sql.push_str(", priority = ?");
            bind_values.push(Value::Text(priority.as_str().to_string()));
        }

        sql.push_str(" WHERE id = ?;");
        bind_values.push(Value::Integer(id));

        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        if changed == 0 {
            return Err(not_found(id));
        }

        self.get_task(id)?.ok_or_else(|| missing_after_write(id))
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1;", params![id])?;

        if changed == 0 {
            return Err(not_found(id));
        }

        Ok(())
    }

    fn list_tasks(&self) -> RepoResult<Vec<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} ORDER BY id ASC;"))?;

        let mut rows = stmt.query([])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }

    fn delete_all_tasks(&self) -> RepoResult<usize> {
        let changed = self.conn.execute("DELETE FROM tasks;", [])?;
        Ok(changed)
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let id: TaskId = row.get("id")?;

    let status_text: String = row.get("status")?;
    let status = TaskStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in tasks row {id}"))
    })?;

    let priority_text: String = row.get("priority")?;
    let priority = TaskPriority::parse(&priority_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid priority `{priority_text}` in tasks row {id}"
        ))
    })?;

    let task = Task {
        id,
        title: row.get("title")?,
        description: row.get("description")?,
        due_date: row.get("due_date")?,
        status,
        priority,
        user_id: row.get("user_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    task.validate()
        .map_err(|err| RepoError::InvalidData(format!("tasks row {id}: {err}")))?;
    Ok(task)
}

fn not_found(id: TaskId) -> RepoError {
    RepoError::NotFound {
        kind: EntityKind::Task,
        id: id.to_string(),
    }
}

fn missing_after_write(id: TaskId) -> RepoError {
    RepoError::InvalidData(format!("task {id} missing on post-write read-back"))
}
