use skillpath_domain::TimetableService;
use skillpath_store::LocalStore;
use skillpath_sync::Outbox;
use skillpath_types::MutationAction;

fn service() -> (Outbox, TimetableService) {
    let store = LocalStore::open_in_memory().unwrap();
    (Outbox::new(store.clone()), TimetableService::new(store))
}

#[test]
fn add_slot_enqueues() {
    let (outbox, service) = service();
    service.add_slot("Study group", 2, 18 * 60, 19 * 60).unwrap();
    assert_eq!(outbox.pending_count().unwrap(), 1);
}

#[test]
fn week_sorted_by_day_then_start() {
    let (_, service) = service();
    service.add_slot("Wed evening", 2, 18 * 60, 19 * 60).unwrap();
    service.add_slot("Mon morning", 0, 8 * 60, 9 * 60).unwrap();
    service.add_slot("Wed morning", 2, 9 * 60, 10 * 60).unwrap();

    let week = service.week().unwrap();
    let titles: Vec<&str> = week.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, ["Mon morning", "Wed morning", "Wed evening"]);
}

#[test]
fn remove_slot_enqueues_delete() {
    let (outbox, service) = service();
    let slot = service.add_slot("Study group", 2, 18 * 60, 19 * 60).unwrap();

    service.remove_slot(slot.id).unwrap();

    assert!(service.week().unwrap().is_empty());
    let pending = outbox.pending(None).unwrap();
    assert_eq!(pending.len(), 2);
    assert_eq!(pending[1].action, MutationAction::Delete);
}

#[test]
fn remove_missing_slot_is_noop() {
    let (outbox, service) = service();
    service.remove_slot(skillpath_types::RecordId::new()).unwrap();
    assert_eq!(outbox.pending_count().unwrap(), 0);
}
