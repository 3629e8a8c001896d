use skillpath_domain::{AppConfig, AppCore};
use skillpath_sync::connectivity::mock::StaticProbe;
use skillpath_sync::remote::mock::MockRemoteApi;
use skillpath_sync::{SyncConfig, SyncError, SyncOutcome};
use skillpath_types::{Course, MutationPayload};
use std::sync::Arc;
use std::time::Duration;

fn app() -> (Arc<MockRemoteApi>, AppCore) {
    let remote = Arc::new(MockRemoteApi::new());
    let app = AppCore::new(AppConfig::default(), remote.clone(), None).unwrap();
    (remote, app)
}

// ── Lifecycle ────────────────────────────────────────────────────

#[tokio::test]
async fn start_and_shutdown_are_idempotent() {
    let (_, app) = app();
    app.start();
    app.start();
    app.shutdown().await;
    app.shutdown().await;
}

#[tokio::test]
async fn shutdown_without_start_is_safe() {
    let (_, app) = app();
    app.shutdown().await;
}

#[test]
fn open_on_disk_store() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        db_path: Some(dir.path().join("skillpath.db")),
        sync: SyncConfig::default(),
    };
    let app = AppCore::new(config, Arc::new(MockRemoteApi::new()), None).unwrap();
    assert_eq!(app.pending_changes().unwrap(), 0);
}

#[test]
fn unwritable_store_path_is_fatal() {
    let config = AppConfig {
        db_path: Some("/definitely/not/a/writable/path/app.db".into()),
        sync: SyncConfig::default(),
    };
    assert!(AppCore::new(config, Arc::new(MockRemoteApi::new()), None).is_err());
}

// ── Offline-first flow through the assembled core ────────────────

#[tokio::test]
async fn offline_writes_sync_after_reconnect() {
    let (remote, app) = app();

    // Starts offline: every domain write lands locally and queues.
    let course = app
        .learning()
        .create_course("Algebra", "", "mathematics")
        .unwrap();
    app.learning()
        .add_lesson(course.id, "Intro", "", 0, 10)
        .unwrap();
    app.timetable().add_slot("Study", 1, 600, 660).unwrap();
    assert_eq!(app.pending_changes().unwrap(), 3);
    assert!(app.last_sync_time().is_none());

    // Reconnect and drain manually.
    app.monitor().set_online(true);
    let outcome = app.sync_now().await.unwrap();
    assert!(matches!(outcome, SyncOutcome::Completed(r) if r.synced == 3));

    assert_eq!(app.pending_changes().unwrap(), 0);
    assert_eq!(remote.call_count(), 3);
    assert!(app.last_sync_time().is_some());
}

#[tokio::test]
async fn background_service_drains_on_reconnect() {
    let (remote, app) = app();
    app.learning()
        .create_course("Algebra", "", "mathematics")
        .unwrap();

    app.start();
    app.monitor().set_online(true);
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(remote.call_count(), 1);
    assert_eq!(app.pending_changes().unwrap(), 0);
    app.shutdown().await;
}

#[tokio::test]
async fn probe_feeds_the_monitor() {
    let remote = Arc::new(MockRemoteApi::new());
    let probe = Arc::new(StaticProbe::new(true));
    let config = AppConfig {
        db_path: None,
        sync: SyncConfig {
            probe_interval: Duration::from_millis(30),
            ..Default::default()
        },
    };
    let app = AppCore::new(config, remote, Some(probe)).unwrap();

    assert!(!app.monitor().is_online());
    app.start();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(app.monitor().is_online());
    app.shutdown().await;
}

// ── Sync surface ─────────────────────────────────────────────────

#[tokio::test]
async fn sync_now_while_offline_reports_offline() {
    let (_, app) = app();
    let outcome = app.sync_now().await.unwrap();
    assert_eq!(outcome, SyncOutcome::Offline);
}

#[tokio::test]
async fn download_from_server_requires_connectivity() {
    let (remote, app) = app();
    remote.push_pull_record(MutationPayload::Course(Course::new(
        "Algebra",
        "",
        "mathematics",
    )));

    let err = app.download_from_server().await.unwrap_err();
    assert!(matches!(err, SyncError::Offline));
    assert!(app.learning().courses().unwrap().is_empty());
}

#[tokio::test]
async fn download_from_server_seeds_the_store() {
    let (remote, app) = app();
    let course = Course::new("Algebra", "", "mathematics");
    remote.push_pull_record(MutationPayload::Course(course.clone()));

    app.monitor().set_online(true);
    let applied = app.download_from_server().await.unwrap();
    assert_eq!(applied, 1);

    let courses = app.learning().courses().unwrap();
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0].id, course.id);
    // Pulls never generate outbox traffic.
    assert_eq!(app.pending_changes().unwrap(), 0);
}

#[tokio::test]
async fn failed_items_surface_abandoned_entries() {
    let remote = Arc::new(MockRemoteApi::new());
    let config = AppConfig {
        db_path: None,
        sync: SyncConfig {
            max_attempts: Some(1),
            ..Default::default()
        },
    };
    let app = AppCore::new(config, remote.clone(), None).unwrap();

    app.learning()
        .create_course("Algebra", "", "mathematics")
        .unwrap();
    remote.set_always_fail(true);
    app.monitor().set_online(true);

    let outcome = app.sync_now().await.unwrap();
    assert!(matches!(outcome, SyncOutcome::Completed(r) if r.abandoned == 1));

    assert_eq!(app.pending_changes().unwrap(), 0);
    assert_eq!(app.failed_items().unwrap().len(), 1);
}
