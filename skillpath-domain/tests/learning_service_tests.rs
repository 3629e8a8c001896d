use skillpath_domain::LearningService;
use skillpath_store::{LocalStore, StoreError};
use skillpath_sync::remote::mock::MockRemoteApi;
use skillpath_sync::{ConnectivityMonitor, Outbox, SyncConfig, SyncDriver, SyncOutcome};
use skillpath_types::{EntityKind, MutationAction, MutationPayload, OutboxStatus, QuizQuestion};
use std::sync::Arc;

fn service() -> (LocalStore, Outbox, LearningService) {
    let store = LocalStore::open_in_memory().unwrap();
    let outbox = Outbox::new(store.clone());
    let service = LearningService::new(store.clone());
    (store, outbox, service)
}

// ── Courses ──────────────────────────────────────────────────────

#[test]
fn create_course_writes_row_and_outbox_entry() {
    let (store, outbox, service) = service();
    let course = service
        .create_course("Algebra", "Linear equations", "mathematics")
        .unwrap();

    assert_eq!(store.count("courses").unwrap(), 1);

    let pending = outbox.pending(None).unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].action, MutationAction::Create);
    assert_eq!(pending[0].entity_kind, EntityKind::Course);
    assert_eq!(pending[0].entity_id, course.id);
}

#[test]
fn update_course_changes_fields_and_enqueues() {
    let (_, outbox, service) = service();
    let course = service.create_course("Algebra", "", "mathematics").unwrap();

    let updated = service
        .update_course(course.id, Some("Algebra II".into()), None)
        .unwrap();
    assert_eq!(updated.title, "Algebra II");
    assert!(updated.updated_at >= course.updated_at);

    let pending = outbox.pending(None).unwrap();
    assert_eq!(pending.len(), 2);
    assert_eq!(pending[1].action, MutationAction::Update);
}

#[test]
fn update_missing_course_is_not_found() {
    let (_, _, service) = service();
    let err = service
        .update_course(skillpath_types::RecordId::new(), Some("X".into()), None)
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[test]
fn delete_course_removes_row_and_enqueues() {
    let (store, outbox, service) = service();
    let course = service.create_course("Algebra", "", "mathematics").unwrap();

    service.delete_course(course.id).unwrap();

    assert_eq!(store.count("courses").unwrap(), 0);
    let pending = outbox.pending(None).unwrap();
    assert_eq!(pending.len(), 2);
    assert_eq!(pending[1].action, MutationAction::Delete);
    // The deletion payload carries the last-known record.
    match &pending[1].payload {
        MutationPayload::Course(c) => assert_eq!(c.id, course.id),
        other => panic!("unexpected payload {other:?}"),
    }
}

#[test]
fn delete_missing_course_is_noop() {
    let (_, outbox, service) = service();
    service
        .delete_course(skillpath_types::RecordId::new())
        .unwrap();
    assert_eq!(outbox.pending_count().unwrap(), 0);
}

#[test]
fn courses_lists_in_insertion_order() {
    let (_, _, service) = service();
    service.create_course("A", "", "mathematics").unwrap();
    service.create_course("B", "", "science").unwrap();

    let courses = service.courses().unwrap();
    let titles: Vec<&str> = courses.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, ["A", "B"]);
}

// ── Lessons ──────────────────────────────────────────────────────

#[test]
fn lessons_for_course_ordered_by_position() {
    let (_, _, service) = service();
    let course = service.create_course("Algebra", "", "mathematics").unwrap();
    let other = service.create_course("Biology", "", "science").unwrap();

    service.add_lesson(course.id, "Third", "", 2, 10).unwrap();
    service.add_lesson(course.id, "First", "", 0, 10).unwrap();
    service.add_lesson(other.id, "Unrelated", "", 0, 10).unwrap();
    service.add_lesson(course.id, "Second", "", 1, 10).unwrap();

    let lessons = service.lessons_for_course(course.id).unwrap();
    let titles: Vec<&str> = lessons.iter().map(|l| l.title.as_str()).collect();
    assert_eq!(titles, ["First", "Second", "Third"]);
}

// ── Progress upsert ──────────────────────────────────────────────

#[test]
fn record_progress_upserts() {
    let (store, outbox, service) = service();
    let course = service.create_course("Algebra", "", "mathematics").unwrap();
    let lesson = service.add_lesson(course.id, "Intro", "", 0, 10).unwrap();

    let first = service.record_progress(lesson.id, false, 40).unwrap();
    let second = service.record_progress(lesson.id, true, 100).unwrap();

    // Same row both times.
    assert_eq!(first.id, second.id);
    assert_eq!(store.count("lesson_progress").unwrap(), 1);
    assert!(second.completed);

    // Course + lesson + two progress mutations.
    let pending = outbox.pending(None).unwrap();
    assert_eq!(pending.len(), 4);
    assert_eq!(pending[2].action, MutationAction::Create);
    assert_eq!(pending[3].action, MutationAction::Update);
}

// ── Quizzes ──────────────────────────────────────────────────────

#[test]
fn quiz_and_attempts() {
    let (_, outbox, service) = service();
    let course = service.create_course("Algebra", "", "mathematics").unwrap();
    let quiz = service
        .create_quiz(
            course.id,
            "Checkpoint",
            vec![QuizQuestion {
                prompt: "2 + 2?".into(),
                choices: vec!["3".into(), "4".into()],
                answer_index: 1,
            }],
        )
        .unwrap();

    service.record_quiz_attempt(quiz.id, 0, 1).unwrap();
    service.record_quiz_attempt(quiz.id, 1, 1).unwrap();

    let attempts = service.attempts_for_quiz(quiz.id).unwrap();
    assert_eq!(attempts.len(), 2);
    assert_eq!(outbox.pending_count().unwrap(), 4);
}

// ── End-to-end: offline write, reconnect, drain ──────────────────

#[tokio::test]
async fn offline_lesson_create_syncs_on_reconnect() {
    let store = LocalStore::open_in_memory().unwrap();
    let outbox = Outbox::new(store.clone());
    let service = LearningService::new(store.clone());
    let monitor = Arc::new(ConnectivityMonitor::new(false));
    let remote = Arc::new(MockRemoteApi::new());
    let driver = SyncDriver::new(
        store.clone(),
        outbox.clone(),
        Arc::clone(&monitor),
        remote.clone(),
        SyncConfig::default(),
    );

    // Create a lesson while offline.
    let course = service.create_course("Algebra", "", "mathematics").unwrap();
    let lesson = service.add_lesson(course.id, "Intro", "", 0, 10).unwrap();
    assert_eq!(outbox.pending_count().unwrap(), 2);

    // Reconnect and drain.
    monitor.set_online(true);
    let outcome = driver.sync_pending_changes().await.unwrap();
    assert!(matches!(outcome, SyncOutcome::Completed(r) if r.synced == 2));

    assert_eq!(outbox.pending_count().unwrap(), 0);
    assert!(driver.last_sync_time().is_some());

    // The lesson went out as (lesson, create, {...}).
    let calls = remote.calls();
    let (action, payload) = &calls[1];
    assert_eq!(*action, MutationAction::Create);
    match payload {
        MutationPayload::Lesson(l) => assert_eq!(l.id, lesson.id),
        other => panic!("unexpected payload {other:?}"),
    }

    // Every entry is now terminal-synced.
    for entry in store
        .find_many("sync_status", skillpath_store::OrderBy::Insertion)
        .unwrap()
    {
        let entry: skillpath_types::OutboxEntry = serde_json::from_value(entry.data).unwrap();
        assert_eq!(entry.status, OutboxStatus::Synced);
    }
}
