use rusqlite::Connection;
use taskdock_core::db::open_db_in_memory;
use taskdock_core::{
    now_epoch_ms, ConstraintKind, NewSession, NewUser, RepoError, SessionPatch, SessionRepository,
    SqliteSessionRepository, SqliteUserRepository, User, UserRepository,
};
use uuid::Uuid;

#[test]
fn create_with_explicit_id_roundtrips() {
    let conn = open_db_in_memory().unwrap();
    let owner = fixture_user(&conn);
    let repo = SqliteSessionRepository::try_new(&conn).unwrap();

    let expires_at = now_epoch_ms() + 3_600_000;
    let created = repo
        .create_session(&NewSession::with_id("session1", owner.id, expires_at))
        .unwrap();
    assert_eq!(created.id, "session1");
    assert_eq!(created.user_id, owner.id);
    assert_eq!(created.expires_at, expires_at);

    let loaded = repo.get_session("session1").unwrap().unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded.user_id, owner.id);
}

#[test]
fn full_lifecycle_create_extend_delete() {
    let conn = open_db_in_memory().unwrap();
    let owner = fixture_user(&conn);
    let repo = SqliteSessionRepository::try_new(&conn).unwrap();

    let created = repo
        .create_session(&NewSession::with_id(
            "session1",
            owner.id,
            now_epoch_ms() + 3_600_000,
        ))
        .unwrap();

    let extended = now_epoch_ms() + 7_200_000;
    let patch = SessionPatch {
        expires_at: Some(extended),
    };
    let updated = repo.update_session("session1", &patch).unwrap();
    assert_eq!(updated.expires_at, extended);
    assert_eq!(updated.user_id, owner.id);
    assert_eq!(updated.created_at, created.created_at);

    let loaded = repo.get_session("session1").unwrap().unwrap();
    assert_eq!(loaded.expires_at, extended);

    repo.delete_session("session1").unwrap();
    assert!(repo.get_session("session1").unwrap().is_none());
}

#[test]
fn create_generates_a_token_when_caller_has_none() {
    let conn = open_db_in_memory().unwrap();
    let owner = fixture_user(&conn);
    let repo = SqliteSessionRepository::try_new(&conn).unwrap();

    let created = repo
        .create_session(&NewSession::new(owner.id, now_epoch_ms() + 3_600_000))
        .unwrap();
    Uuid::parse_str(&created.id).unwrap();

    let loaded = repo.get_session(&created.id).unwrap().unwrap();
    assert_eq!(loaded, created);
}

#[test]
fn duplicate_session_id_is_a_unique_constraint_violation() {
    let conn = open_db_in_memory().unwrap();
    let owner = fixture_user(&conn);
    let repo = SqliteSessionRepository::try_new(&conn).unwrap();

    let expires_at = now_epoch_ms() + 3_600_000;
    repo.create_session(&NewSession::with_id("session1", owner.id, expires_at))
        .unwrap();
    let err = repo
        .create_session(&NewSession::with_id("session1", owner.id, expires_at))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Constraint {
            kind: ConstraintKind::Unique,
            ..
        }
    ));
}

#[test]
fn create_with_unknown_owner_is_a_foreign_key_violation() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSessionRepository::try_new(&conn).unwrap();

    let err = repo
        .create_session(&NewSession::with_id(
            "session1",
            999_999,
            now_epoch_ms() + 3_600_000,
        ))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Constraint {
            kind: ConstraintKind::ForeignKey,
            ..
        }
    ));
    assert!(repo.get_session("session1").unwrap().is_none());
}

#[test]
fn get_missing_id_is_none_not_an_error() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSessionRepository::try_new(&conn).unwrap();

    assert!(repo.get_session("no-such-session").unwrap().is_none());
}

#[test]
fn update_and_delete_missing_id_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSessionRepository::try_new(&conn).unwrap();

    let patch = SessionPatch {
        expires_at: Some(now_epoch_ms() + 7_200_000),
    };
    let err = repo.update_session("no-such-session", &patch).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { .. }));
    assert!(err.to_string().contains("session"));

    let err = repo.delete_session("no-such-session").unwrap_err();
    assert!(matches!(err, RepoError::NotFound { .. }));
}

#[test]
fn list_orders_by_created_at_then_id() {
    let conn = open_db_in_memory().unwrap();
    let owner = fixture_user(&conn);
    let repo = SqliteSessionRepository::try_new(&conn).unwrap();

    let expires_at = now_epoch_ms() + 3_600_000;
    repo.create_session(&NewSession::with_id("session2", owner.id, expires_at))
        .unwrap();
    repo.create_session(&NewSession::with_id("session3", owner.id, expires_at))
        .unwrap();
    repo.create_session(&NewSession::with_id("session1", owner.id, expires_at))
        .unwrap();

    conn.execute("UPDATE sessions SET created_at = 1234567890000;", [])
        .unwrap();
    let ids: Vec<String> = repo
        .list_sessions()
        .unwrap()
        .into_iter()
        .map(|session| session.id)
        .collect();
    assert_eq!(ids, vec!["session1", "session2", "session3"]);

    conn.execute(
        "UPDATE sessions SET created_at = 1000 WHERE id = ?1;",
        ["session3"],
    )
    .unwrap();
    let ids: Vec<String> = repo
        .list_sessions()
        .unwrap()
        .into_iter()
        .map(|session| session.id)
        .collect();
    assert_eq!(ids, vec!["session3", "session1", "session2"]);
}

#[test]
fn delete_all_reports_count() {
    let conn = open_db_in_memory().unwrap();
    let owner = fixture_user(&conn);
    let repo = SqliteSessionRepository::try_new(&conn).unwrap();

    let expires_at = now_epoch_ms() + 3_600_000;
    repo.create_session(&NewSession::with_id("session1", owner.id, expires_at))
        .unwrap();
    repo.create_session(&NewSession::with_id("session2", owner.id, expires_at))
        .unwrap();

    assert_eq!(repo.delete_all_sessions().unwrap(), 2);
    assert!(repo.list_sessions().unwrap().is_empty());
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteSessionRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::UninitializedConnection { .. })
    ));
}

fn fixture_user(conn: &Connection) -> User {
    let repo = SqliteUserRepository::try_new(conn).unwrap();
    repo.create_user(&NewUser::new(
        "session-fixture@taskdock.test",
        "session_fixture",
    ))
    .unwrap()
}
