use taskdock_core::{
    NewSession, NewTask, NewUser, Session, SessionPatch, Task, TaskPatch, TaskPriority,
    TaskStatus, User, UserPatch, ValidationError,
};
use uuid::Uuid;

#[test]
fn new_task_sets_defaults() {
    let draft = NewTask::new("Test Task", 7);

    assert_eq!(draft.title, "Test Task");
    assert_eq!(draft.description, None);
    assert_eq!(draft.due_date, None);
    assert_eq!(draft.status, TaskStatus::NotStarted);
    assert_eq!(draft.priority, TaskPriority::Medium);
    assert_eq!(draft.user_id, 7);
    draft.validate().unwrap();
}

#[test]
fn new_session_generates_unique_parseable_tokens() {
    let first = NewSession::new(1, 1_700_000_000_000);
    let second = NewSession::new(1, 1_700_000_000_000);

    assert_ne!(first.id, second.id);
    Uuid::parse_str(&first.id).unwrap();
    Uuid::parse_str(&second.id).unwrap();
}

#[test]
fn new_session_with_id_keeps_caller_id() {
    let draft = NewSession::with_id("session1", 1, 1_700_000_000_000);
    assert_eq!(draft.id, "session1");
    draft.validate().unwrap();
}

#[test]
fn user_draft_validation_rejects_bad_shapes() {
    let err = NewUser::new("not-an-address", "testuser").validate().unwrap_err();
    assert_eq!(err, ValidationError::InvalidEmail("not-an-address".to_string()));

    let err = NewUser::new("test@example.com", "  ").validate().unwrap_err();
    assert_eq!(err, ValidationError::EmptyUsername);
}

#[test]
fn task_draft_validation_rejects_bad_shapes() {
    let err = NewTask::new("", 1).validate().unwrap_err();
    assert_eq!(err, ValidationError::EmptyTitle);

    let err = NewTask::new("Test Task", 0).validate().unwrap_err();
    assert_eq!(err, ValidationError::NonPositiveOwner(0));
}

#[test]
fn session_draft_validation_rejects_bad_shapes() {
    let err = NewSession::with_id("", 1, 1_700_000_000_000)
        .validate()
        .unwrap_err();
    assert_eq!(err, ValidationError::EmptySessionId);

    let err = NewSession::with_id("session1", -4, 1_700_000_000_000)
        .validate()
        .unwrap_err();
    assert_eq!(err, ValidationError::NonPositiveOwner(-4));

    let err = NewSession::with_id("session1", 1, 0).validate().unwrap_err();
    assert_eq!(err, ValidationError::NonPositiveExpiry(0));
}

#[test]
fn empty_patches_are_rejected() {
    assert_eq!(
        UserPatch::default().validate().unwrap_err(),
        ValidationError::EmptyPatch
    );
    assert_eq!(
        TaskPatch::default().validate().unwrap_err(),
        ValidationError::EmptyPatch
    );
    assert_eq!(
        SessionPatch::default().validate().unwrap_err(),
        ValidationError::EmptyPatch
    );
}

#[test]
fn patch_validation_checks_present_fields_only() {
    let patch = UserPatch {
        email: Some("updated@example.com".to_string()),
        username: None,
    };
    patch.validate().unwrap();

    let patch = UserPatch {
        email: Some("broken".to_string()),
        username: None,
    };
    assert_eq!(
        patch.validate().unwrap_err(),
        ValidationError::InvalidEmail("broken".to_string())
    );

    let patch = TaskPatch {
        title: Some(" ".to_string()),
        ..TaskPatch::default()
    };
    assert_eq!(patch.validate().unwrap_err(), ValidationError::EmptyTitle);

    let patch = SessionPatch {
        expires_at: Some(-1),
    };
    assert_eq!(
        patch.validate().unwrap_err(),
        ValidationError::NonPositiveExpiry(-1)
    );
}

#[test]
fn user_serialization_uses_expected_wire_fields() {
    let user = User {
        id: 42,
        email: "test@example.com".to_string(),
        username: "testuser".to_string(),
        created_at: 1_700_000_000_000,
        updated_at: 1_700_000_000_000,
    };

    let json = serde_json::to_value(&user).unwrap();
    assert_eq!(json["id"], 42);
    assert_eq!(json["email"], "test@example.com");
    assert_eq!(json["username"], "testuser");

    let decoded: User = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, user);
}

#[test]
fn task_serialization_uses_snake_case_enum_names() {
    let task = Task {
        id: 3,
        title: "Test Task".to_string(),
        description: Some("details".to_string()),
        due_date: Some(1_700_000_360_000),
        status: TaskStatus::InProgress,
        priority: TaskPriority::High,
        user_id: 42,
        created_at: 1_700_000_000_000,
        updated_at: 1_700_000_000_000,
    };

    let json = serde_json::to_value(&task).unwrap();
    assert_eq!(json["status"], "in_progress");
    assert_eq!(json["priority"], "high");
    assert_eq!(json["user_id"], 42);

    let decoded: Task = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, task);
}

#[test]
fn session_serialization_round_trips() {
    let session = Session {
        id: "session1".to_string(),
        user_id: 42,
        expires_at: 1_700_003_600_000,
        created_at: 1_700_000_000_000,
        updated_at: 1_700_000_000_000,
    };

    let json = serde_json::to_value(&session).unwrap();
    assert_eq!(json["id"], "session1");
    assert_eq!(json["expires_at"], 1_700_003_600_000_i64);

    let decoded: Session = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, session);
}

#[test]
fn status_and_priority_db_names_round_trip() {
    for status in [
        TaskStatus::NotStarted,
        TaskStatus::InProgress,
        TaskStatus::Done,
        TaskStatus::Cancelled,
    ] {
        assert_eq!(TaskStatus::parse(status.as_str()), Some(status));
    }
    assert_eq!(TaskStatus::parse("paused"), None);

    for priority in [TaskPriority::Low, TaskPriority::Medium, TaskPriority::High] {
        assert_eq!(TaskPriority::parse(priority.as_str()), Some(priority));
    }
    assert_eq!(TaskPriority::parse("urgent"), None);
}
