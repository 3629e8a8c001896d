use skillpath_domain::CareerService;
use skillpath_store::LocalStore;
use skillpath_sync::Outbox;
use skillpath_types::MutationAction;

fn service() -> (LocalStore, Outbox, CareerService) {
    let store = LocalStore::open_in_memory().unwrap();
    (
        store.clone(),
        Outbox::new(store.clone()),
        CareerService::new(store),
    )
}

#[test]
fn first_save_creates_the_profile() {
    let (store, outbox, service) = service();
    let profile = service
        .save_resume(
            "Amina Diallo",
            "Junior developer",
            "Final-year CS student.",
            vec!["rust".into(), "sql".into()],
        )
        .unwrap();

    assert_eq!(profile.skills.len(), 2);
    assert_eq!(store.count("resume_profiles").unwrap(), 1);

    let pending = outbox.pending(None).unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].action, MutationAction::Create);
}

#[test]
fn second_save_updates_in_place() {
    let (store, outbox, service) = service();
    let first = service
        .save_resume("Amina Diallo", "Junior developer", "", vec![])
        .unwrap();
    let second = service
        .save_resume(
            "Amina Diallo",
            "Backend developer",
            "Now with internship experience.",
            vec!["rust".into()],
        )
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.headline, "Backend developer");
    assert!(second.updated_at >= first.updated_at);
    assert_eq!(store.count("resume_profiles").unwrap(), 1);

    let pending = outbox.pending(None).unwrap();
    assert_eq!(pending.len(), 2);
    assert_eq!(pending[1].action, MutationAction::Update);
}

#[test]
fn resume_is_none_before_first_save() {
    let (_, _, service) = service();
    assert!(service.resume().unwrap().is_none());
}

#[test]
fn resume_reads_back_saved_profile() {
    let (_, _, service) = service();
    service
        .save_resume("Amina Diallo", "Junior developer", "", vec![])
        .unwrap();
    let profile = service.resume().unwrap().unwrap();
    assert_eq!(profile.full_name, "Amina Diallo");
}
