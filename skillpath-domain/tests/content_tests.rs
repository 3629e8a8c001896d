use chrono::{Duration, Utc};
use skillpath_domain::OfflineContentManager;
use skillpath_store::LocalStore;
use skillpath_sync::Outbox;
use skillpath_types::{ContentType, RecordId};

fn manager() -> (Outbox, OfflineContentManager) {
    let store = LocalStore::open_in_memory().unwrap();
    (Outbox::new(store.clone()), OfflineContentManager::new(store))
}

#[test]
fn register_and_list_for_entity() {
    let (_, manager) = manager();
    let lesson = RecordId::new();
    let other = RecordId::new();

    manager
        .register_download(
            ContentType::Pdf,
            lesson,
            "/cache/l3.pdf",
            "https://cdn.skillpath.app/l3.pdf",
            1000,
        )
        .unwrap();
    manager
        .register_download(
            ContentType::Video,
            other,
            "/cache/intro.mp4",
            "https://cdn.skillpath.app/intro.mp4",
            5000,
        )
        .unwrap();

    let refs = manager.for_entity(lesson).unwrap();
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].local_path, "/cache/l3.pdf");
}

#[test]
fn downloads_never_touch_the_outbox() {
    let (outbox, manager) = manager();
    manager
        .register_download(
            ContentType::Pdf,
            RecordId::new(),
            "/cache/a.pdf",
            "https://cdn.skillpath.app/a.pdf",
            10,
        )
        .unwrap();
    assert_eq!(outbox.pending_count().unwrap(), 0);
}

#[test]
fn touch_bumps_last_accessed() {
    let (_, manager) = manager();
    let entity = RecordId::new();
    let content = manager
        .register_download(
            ContentType::Audio,
            entity,
            "/cache/p.mp3",
            "https://cdn.skillpath.app/p.mp3",
            10,
        )
        .unwrap();

    std::thread::sleep(std::time::Duration::from_millis(5));
    manager.touch(content.id).unwrap();

    let refs = manager.for_entity(entity).unwrap();
    assert!(refs[0].last_accessed_at > content.last_accessed_at);
}

#[test]
fn evict_removes_the_entry() {
    let (_, manager) = manager();
    let entity = RecordId::new();
    let content = manager
        .register_download(
            ContentType::Pdf,
            entity,
            "/cache/a.pdf",
            "https://cdn.skillpath.app/a.pdf",
            10,
        )
        .unwrap();

    assert!(manager.evict(content.id).unwrap());
    assert!(!manager.evict(content.id).unwrap());
    assert!(manager.for_entity(entity).unwrap().is_empty());
}

#[test]
fn evict_older_than_prefers_cold_entries() {
    let (_, manager) = manager();
    let entity = RecordId::new();
    let cold = manager
        .register_download(
            ContentType::Pdf,
            entity,
            "/cache/cold.pdf",
            "https://cdn.skillpath.app/cold.pdf",
            10,
        )
        .unwrap();
    std::thread::sleep(std::time::Duration::from_millis(10));
    let cutoff = Utc::now();
    let warm = manager
        .register_download(
            ContentType::Pdf,
            entity,
            "/cache/warm.pdf",
            "https://cdn.skillpath.app/warm.pdf",
            10,
        )
        .unwrap();

    let evicted = manager.evict_older_than(cutoff).unwrap();
    assert_eq!(evicted, 1);

    let remaining = manager.for_entity(entity).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, warm.id);
    assert_ne!(remaining[0].id, cold.id);
}

#[test]
fn evict_older_than_future_cutoff_clears_all() {
    let (_, manager) = manager();
    for i in 0..3 {
        manager
            .register_download(
                ContentType::Image,
                RecordId::new(),
                format!("/cache/{i}.png"),
                format!("https://cdn.skillpath.app/{i}.png"),
                10,
            )
            .unwrap();
    }
    let evicted = manager.evict_older_than(Utc::now() + Duration::hours(1)).unwrap();
    assert_eq!(evicted, 3);
}

#[test]
fn total_size_sums_files() {
    let (_, manager) = manager();
    manager
        .register_download(
            ContentType::Pdf,
            RecordId::new(),
            "/cache/a.pdf",
            "https://cdn.skillpath.app/a.pdf",
            1000,
        )
        .unwrap();
    manager
        .register_download(
            ContentType::Video,
            RecordId::new(),
            "/cache/b.mp4",
            "https://cdn.skillpath.app/b.mp4",
            2500,
        )
        .unwrap();

    assert_eq!(manager.total_size().unwrap(), 3500);
}

#[test]
fn total_size_empty_cache() {
    let (_, manager) = manager();
    assert_eq!(manager.total_size().unwrap(), 0);
}
