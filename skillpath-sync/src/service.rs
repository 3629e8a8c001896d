//! Background sync service.
//!
//! Owns the one loop that triggers drain passes: connectivity transitions
//! to online trigger an immediate pass, and a periodic timer sweeps up
//! anything left behind. Both paths go through the driver's mutual
//! exclusion, so overlapping triggers coalesce.

use crate::connectivity::ConnectivityMonitor;
use crate::driver::{SyncDriver, SyncOutcome};
use crate::error::SyncResult;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Drives periodic and connectivity-triggered sync passes.
///
/// Explicitly constructed with injected dependencies; `start`/`stop` are
/// both idempotent.
pub struct SyncService {
    driver: Arc<SyncDriver>,
    monitor: Arc<ConnectivityMonitor>,
    shutdown_tx: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SyncService {
    /// Creates the service. Nothing runs until [`SyncService::start`].
    pub fn new(driver: Arc<SyncDriver>, monitor: Arc<ConnectivityMonitor>) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            driver,
            monitor,
            shutdown_tx,
            task: Mutex::new(None),
        }
    }

    /// Starts the background loop. Idempotent while running.
    pub fn start(&self) {
        let mut guard = self.task.lock().unwrap();
        if guard.is_some() {
            return;
        }
        self.shutdown_tx.send_replace(false);

        let driver = Arc::clone(&self.driver);
        let monitor = Arc::clone(&self.monitor);
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        // Subscribe before spawning so a transition that lands right after
        // start() cannot be missed.
        let mut connectivity = self.monitor.subscribe();
        let interval = driver.config().sync_interval;

        *guard = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately; consume it so the loop
            // only sweeps after a full interval.
            ticker.tick().await;

            info!("sync service started");
            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    changed = connectivity.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let online = *connectivity.borrow_and_update();
                        if online {
                            info!("connectivity restored, draining outbox");
                            if let Err(e) = driver.sync_pending_changes().await {
                                warn!(error = %e, "sync after reconnect failed");
                            }
                        } else {
                            debug!("connectivity lost");
                        }
                    }
                    _ = ticker.tick() => {
                        if monitor.is_online() {
                            if let Err(e) = driver.sync_pending_changes().await {
                                warn!(error = %e, "periodic sync failed");
                            }
                        }
                    }
                }
            }
            debug!("sync service loop stopped");
        }));
    }

    /// Whether the background loop is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.lock().unwrap().is_some()
    }

    /// Manually triggers a drain pass (e.g. pull-to-refresh). Goes through
    /// the same mutual exclusion as the background triggers.
    pub async fn sync_now(&self) -> SyncResult<SyncOutcome> {
        self.driver.sync_pending_changes().await
    }

    /// Stops the background loop. Safe to call multiple times; does not
    /// interrupt an entry mutation in progress.
    pub async fn stop(&self) {
        let handle = self.task.lock().unwrap().take();
        if let Some(handle) = handle {
            let _ = self.shutdown_tx.send(true);
            if let Err(e) = handle.await {
                warn!(error = %e, "sync service task ended abnormally");
            }
            info!("sync service stopped");
        }
    }
}
