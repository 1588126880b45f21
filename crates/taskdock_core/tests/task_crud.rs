use rusqlite::Connection;
use taskdock_core::db::open_db_in_memory;
use taskdock_core::{
    ConstraintKind, NewTask, NewUser, RepoError, SqliteTaskRepository, SqliteUserRepository,
    TaskPatch, TaskPriority, TaskRepository, TaskStatus, User, UserRepository,
};

#[test]
fn create_applies_defaults_and_roundtrips() {
    let conn = open_db_in_memory().unwrap();
    let owner = fixture_user(&conn);
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let created = repo.create_task(&NewTask::new("Test Task", owner.id)).unwrap();
    assert!(created.id > 0);
    assert_eq!(created.title, "Test Task");
    assert_eq!(created.description, None);
    assert_eq!(created.due_date, None);
    assert_eq!(created.status, TaskStatus::NotStarted);
    assert_eq!(created.priority, TaskPriority::Medium);
    assert_eq!(created.user_id, owner.id);

    let loaded = repo.get_task(created.id).unwrap().unwrap();
    assert_eq!(loaded, created);
}

#[test]
fn description_and_due_date_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let owner = fixture_user(&conn);
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let mut draft = NewTask::new("Test Task", owner.id);
    draft.description = Some("write the report".to_string());
    draft.due_date = Some(1_700_003_600_000);
    draft.priority = TaskPriority::High;

    let created = repo.create_task(&draft).unwrap();
    let loaded = repo.get_task(created.id).unwrap().unwrap();
    assert_eq!(loaded.description.as_deref(), Some("write the report"));
    assert_eq!(loaded.due_date, Some(1_700_003_600_000));
    assert_eq!(loaded.priority, TaskPriority::High);
}

#[test]
fn full_lifecycle_create_update_delete() {
    let conn = open_db_in_memory().unwrap();
    let owner = fixture_user(&conn);
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let created = repo.create_task(&NewTask::new("Test Task", owner.id)).unwrap();

    let patch = TaskPatch {
        title: Some("Updated Task".to_string()),
        ..TaskPatch::default()
    };
    let updated = repo.update_task(created.id, &patch).unwrap();
    assert_eq!(updated.title, "Updated Task");
    assert_eq!(updated.status, created.status);
    assert_eq!(updated.priority, created.priority);
    assert_eq!(updated.user_id, created.user_id);
    assert_eq!(updated.created_at, created.created_at);

    let loaded = repo.get_task(created.id).unwrap().unwrap();
    assert_eq!(loaded.title, "Updated Task");

    repo.delete_task(created.id).unwrap();
    assert!(repo.get_task(created.id).unwrap().is_none());
}

#[test]
fn status_and_priority_patches_persist() {
    let conn = open_db_in_memory().unwrap();
    let owner = fixture_user(&conn);
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let created = repo.create_task(&NewTask::new("Test Task", owner.id)).unwrap();

    let patch = TaskPatch {
        status: Some(TaskStatus::InProgress),
        priority: Some(TaskPriority::High),
        ..TaskPatch::default()
    };
    let updated = repo.update_task(created.id, &patch).unwrap();
    assert_eq!(updated.status, TaskStatus::InProgress);
    assert_eq!(updated.priority, TaskPriority::High);
    assert_eq!(updated.title, "Test Task");

    let patch = TaskPatch {
        status: Some(TaskStatus::Done),
        ..TaskPatch::default()
    };
    let done = repo.update_task(created.id, &patch).unwrap();
    assert_eq!(done.status, TaskStatus::Done);
    assert_eq!(done.priority, TaskPriority::High);
}

#[test]
fn create_with_unknown_owner_is_a_foreign_key_violation() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let err = repo.create_task(&NewTask::new("Test Task", 999_999)).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Constraint {
            kind: ConstraintKind::ForeignKey,
            ..
        }
    ));
    assert!(repo.list_tasks().unwrap().is_empty());
}

#[test]
fn deleting_an_owner_with_live_tasks_is_a_foreign_key_violation() {
    let conn = open_db_in_memory().unwrap();
    let owner = fixture_user(&conn);
    let tasks = SqliteTaskRepository::try_new(&conn).unwrap();
    let users = SqliteUserRepository::try_new(&conn).unwrap();

    tasks.create_task(&NewTask::new("Test Task", owner.id)).unwrap();

    let err = users.delete_user(owner.id).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Constraint {
            kind: ConstraintKind::ForeignKey,
            ..
        }
    ));

    // The owner survives the rejected delete.
    assert!(users.get_user(owner.id).unwrap().is_some());
}

#[test]
fn update_and_delete_missing_id_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let patch = TaskPatch {
        title: Some("Updated Task".to_string()),
        ..TaskPatch::default()
    };
    let err = repo.update_task(424_242, &patch).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { .. }));
    assert!(err.to_string().contains("task"));

    let err = repo.delete_task(424_242).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { .. }));
}

#[test]
fn list_is_ordered_by_id() {
    let conn = open_db_in_memory().unwrap();
    let owner = fixture_user(&conn);
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let packing = repo.create_task(&NewTask::new("pack bags", owner.id)).unwrap();
    let loading = repo.create_task(&NewTask::new("load van", owner.id)).unwrap();
    let dropping = repo.create_task(&NewTask::new("drop keys", owner.id)).unwrap();
    assert!(packing.id < loading.id && loading.id < dropping.id);

    let ids: Vec<_> = repo
        .list_tasks()
        .unwrap()
        .into_iter()
        .map(|task| task.id)
        .collect();
    assert_eq!(ids, vec![packing.id, loading.id, dropping.id]);
}

#[test]
fn delete_all_reports_count() {
    let conn = open_db_in_memory().unwrap();
    let owner = fixture_user(&conn);
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    repo.create_task(&NewTask::new("first", owner.id)).unwrap();
    repo.create_task(&NewTask::new("second", owner.id)).unwrap();

    assert_eq!(repo.delete_all_tasks().unwrap(), 2);
    assert!(repo.list_tasks().unwrap().is_empty());
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteTaskRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::UninitializedConnection { .. })
    ));
}

fn fixture_user(conn: &Connection) -> User {
    let repo = SqliteUserRepository::try_new(conn).unwrap();
    repo.create_user(&NewUser::new("task-fixture@taskdock.test", "task_fixture"))
        .unwrap()
}
