use skillpath_sync::connectivity::mock::StaticProbe;
use skillpath_sync::ConnectivityMonitor;
use std::sync::Arc;
use std::time::Duration;

// ── State and transitions ────────────────────────────────────────

#[test]
fn initial_state() {
    assert!(!ConnectivityMonitor::new(false).is_online());
    assert!(ConnectivityMonitor::new(true).is_online());
}

#[test]
fn set_online_changes_state() {
    let monitor = ConnectivityMonitor::new(false);
    monitor.set_online(true);
    assert!(monitor.is_online());
    monitor.set_online(false);
    assert!(!monitor.is_online());
}

#[tokio::test]
async fn subscribers_see_transitions() {
    let monitor = ConnectivityMonitor::new(false);
    let mut rx = monitor.subscribe();

    monitor.set_online(true);
    assert!(rx.has_changed().unwrap());
    assert!(*rx.borrow_and_update());

    monitor.set_online(false);
    assert!(rx.has_changed().unwrap());
    assert!(!*rx.borrow_and_update());
}

#[tokio::test]
async fn duplicate_signals_are_deduplicated() {
    let monitor = ConnectivityMonitor::new(true);
    let mut rx = monitor.subscribe();

    // Already online: no transition, no notification.
    monitor.set_online(true);
    assert!(!rx.has_changed().unwrap());
}

#[tokio::test]
async fn multiple_subscribers() {
    let monitor = ConnectivityMonitor::new(false);
    let mut rx1 = monitor.subscribe();
    let mut rx2 = monitor.subscribe();

    monitor.set_online(true);
    assert!(*rx1.borrow_and_update());
    assert!(*rx2.borrow_and_update());
}

// ── Reachability probe ───────────────────────────────────────────

#[tokio::test]
async fn probe_drives_state() {
    let monitor = Arc::new(ConnectivityMonitor::new(false));
    let probe = Arc::new(StaticProbe::new(true));

    monitor.start_probe(probe.clone(), Duration::from_millis(30));
    tokio::time::sleep(Duration::from_millis(20)).await;
    // The first probe fires immediately.
    assert!(monitor.is_online());

    // A false "online" signal is corrected by the next probe.
    probe.set_online(false);
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(!monitor.is_online());

    monitor.stop_probe();
}

#[tokio::test]
async fn start_probe_is_idempotent() {
    let monitor = Arc::new(ConnectivityMonitor::new(false));
    let probe = Arc::new(StaticProbe::new(true));

    monitor.start_probe(probe.clone(), Duration::from_millis(30));
    monitor.start_probe(probe, Duration::from_millis(30)); // no second task

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(monitor.is_online());
    monitor.stop_probe();
}

#[tokio::test]
async fn stop_probe_halts_updates() {
    let monitor = Arc::new(ConnectivityMonitor::new(false));
    let probe = Arc::new(StaticProbe::new(true));

    monitor.start_probe(probe.clone(), Duration::from_millis(20));
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(monitor.is_online());

    monitor.stop_probe();
    probe.set_online(false);
    tokio::time::sleep(Duration::from_millis(50)).await;
    // No probe running: the stale state stays.
    assert!(monitor.is_online());
}

#[tokio::test]
async fn stop_probe_twice_is_safe() {
    let monitor = Arc::new(ConnectivityMonitor::new(false));
    monitor.stop_probe();
    monitor.stop_probe();
}
