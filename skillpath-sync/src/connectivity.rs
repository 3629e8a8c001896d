//! Connectivity monitoring.
//!
//! Single source of truth for online/offline state. Both the platform
//! network signal (via [`ConnectivityMonitor::set_online`]) and the
//! periodic reachability probe feed one watch channel, so subscribers only
//! ever observe a single event source.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Checks whether the remote side is actually reachable.
///
/// Used by the periodic probe to recover from false "online" signals from
/// the platform (captive portals, dead links that still report a carrier).
#[async_trait]
pub trait ReachabilityProbe: Send + Sync {
    /// Returns true if the network is usable right now.
    async fn check(&self) -> bool;
}

/// Reachability probe that issues an HTTP HEAD request.
pub struct HttpProbe {
    client: reqwest::Client,
    url: String,
}

impl HttpProbe {
    /// Creates a probe against the given URL.
    pub fn new(url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("failed to create HTTP client");
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl ReachabilityProbe for HttpProbe {
    async fn check(&self) -> bool {
        // Any response counts as reachable, even an error status.
        self.client.head(&self.url).send().await.is_ok()
    }
}

/// Tracks online/offline state and notifies subscribers on transitions.
pub struct ConnectivityMonitor {
    online_tx: watch::Sender<bool>,
    probe_task: Mutex<Option<JoinHandle<()>>>,
}

impl ConnectivityMonitor {
    /// Creates a monitor with the given initial state.
    #[must_use]
    pub fn new(initially_online: bool) -> Self {
        let (online_tx, _) = watch::channel(initially_online);
        Self {
            online_tx,
            probe_task: Mutex::new(None),
        }
    }

    /// Current state.
    #[must_use]
    pub fn is_online(&self) -> bool {
        *self.online_tx.borrow()
    }

    /// Feeds a network signal into the monitor. Deduplicates: subscribers
    /// are only notified on genuine transitions.
    pub fn set_online(&self, online: bool) {
        let changed = self.online_tx.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
        if changed {
            info!(online, "connectivity changed");
        }
    }

    /// Subscribes to connectivity transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.online_tx.subscribe()
    }

    /// Starts the periodic reachability probe. Idempotent while running.
    ///
    /// The probe fires immediately, then every `interval`.
    pub fn start_probe(
        self: &Arc<Self>,
        probe: Arc<dyn ReachabilityProbe>,
        interval: Duration,
    ) {
        let mut guard = self.probe_task.lock().unwrap();
        if guard.is_some() {
            return;
        }
        let monitor = Arc::clone(self);
        *guard = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let online = probe.check().await;
                debug!(online, "reachability probe");
                monitor.set_online(online);
            }
        }));
    }

    /// Stops the periodic probe. Safe to call multiple times.
    pub fn stop_probe(&self) {
        if let Some(handle) = self.probe_task.lock().unwrap().take() {
            handle.abort();
        }
    }
}

impl Drop for ConnectivityMonitor {
    fn drop(&mut self) {
        self.stop_probe();
    }
}

/// Mock probes for testing.
pub mod mock {
    use super::ReachabilityProbe;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// A probe whose answer is set by the test.
    #[derive(Debug, Default)]
    pub struct StaticProbe {
        online: AtomicBool,
    }

    impl StaticProbe {
        /// Creates a probe that reports the given state.
        #[must_use]
        pub fn new(online: bool) -> Self {
            Self {
                online: AtomicBool::new(online),
            }
        }

        /// Changes the reported state.
        pub fn set_online(&self, online: bool) {
            self.online.store(online, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl ReachabilityProbe for StaticProbe {
        async fn check(&self) -> bool {
            self.online.load(Ordering::SeqCst)
        }
    }
}
