//! App wiring and lifecycle.
//!
//! `AppCore` assembles the whole offline-first subsystem from injected
//! dependencies and exposes the lifecycle hooks the host application
//! calls. No module-level singletons: the host constructs one `AppCore`
//! and passes it down.

use crate::career::CareerService;
use crate::community::CommunityService;
use crate::content::OfflineContentManager;
use crate::learning::LearningService;
use crate::timetable::TimetableService;
use chrono::{DateTime, Utc};
use skillpath_store::{LocalStore, StoreResult};
use skillpath_sync::{
    ConnectivityMonitor, Outbox, ReachabilityProbe, RemoteApi, SyncConfig, SyncDriver,
    SyncOutcome, SyncResult, SyncService,
};
use skillpath_types::{EntityKind, OutboxEntry};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Host-supplied configuration.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Database file path; `None` keeps everything in memory (tests).
    pub db_path: Option<PathBuf>,
    /// Sync tuning knobs.
    pub sync: SyncConfig,
}

/// The assembled offline-first subsystem.
pub struct AppCore {
    store: LocalStore,
    outbox: Outbox,
    monitor: Arc<ConnectivityMonitor>,
    driver: Arc<SyncDriver>,
    service: SyncService,
    probe: Option<Arc<dyn ReachabilityProbe>>,
    probe_interval: std::time::Duration,
    learning: LearningService,
    community: CommunityService,
    career: CareerService,
    timetable: TimetableService,
    content: OfflineContentManager,
}

impl AppCore {
    /// Builds the subsystem. A store open failure is fatal: nothing else
    /// can function without it, so the error propagates and the host must
    /// halt startup.
    pub fn new(
        config: AppConfig,
        remote: Arc<dyn RemoteApi>,
        probe: Option<Arc<dyn ReachabilityProbe>>,
    ) -> StoreResult<Self> {
        let store = match &config.db_path {
            Some(path) => LocalStore::open(path)?,
            None => LocalStore::open_in_memory()?,
        };
        let outbox = Outbox::new(store.clone());
        let monitor = Arc::new(ConnectivityMonitor::new(false));
        let driver = Arc::new(SyncDriver::new(
            store.clone(),
            outbox.clone(),
            Arc::clone(&monitor),
            remote,
            config.sync.clone(),
        ));
        let service = SyncService::new(Arc::clone(&driver), Arc::clone(&monitor));

        Ok(Self {
            learning: LearningService::new(store.clone()),
            community: CommunityService::new(store.clone()),
            career: CareerService::new(store.clone()),
            timetable: TimetableService::new(store.clone()),
            content: OfflineContentManager::new(store.clone()),
            probe_interval: config.sync.probe_interval,
            store,
            outbox,
            monitor,
            driver,
            service,
            probe,
        })
    }

    /// Starts the background sync loop and the reachability probe.
    /// Idempotent; must run before the app relies on background sync.
    pub fn start(&self) {
        self.service.start();
        if let Some(probe) = &self.probe {
            self.monitor
                .start_probe(Arc::clone(probe), self.probe_interval);
        }
        info!("app core started");
    }

    /// Stops timers and the background loop. Safe to call multiple times;
    /// never corrupts the outbox (entry mutations are single transactions).
    pub async fn shutdown(&self) {
        self.service.stop().await;
        self.monitor.stop_probe();
        info!("app core stopped");
    }

    // ── Domain services ──────────────────────────────────────────

    /// Learning: courses, lessons, progress, quizzes.
    #[must_use]
    pub fn learning(&self) -> &LearningService {
        &self.learning
    }

    /// Community: forum threads and posts.
    #[must_use]
    pub fn community(&self) -> &CommunityService {
        &self.community
    }

    /// Career tools: resume profile.
    #[must_use]
    pub fn career(&self) -> &CareerService {
        &self.career
    }

    /// Study timetable.
    #[must_use]
    pub fn timetable(&self) -> &TimetableService {
        &self.timetable
    }

    /// Offline content cache.
    #[must_use]
    pub fn content(&self) -> &OfflineContentManager {
        &self.content
    }

    // ── Sync surface ─────────────────────────────────────────────

    /// The connectivity monitor (for the UI's offline indicator and for
    /// feeding platform network signals).
    #[must_use]
    pub fn monitor(&self) -> &Arc<ConnectivityMonitor> {
        &self.monitor
    }

    /// The underlying store, for host extensions.
    #[must_use]
    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    /// Number of mutations still awaiting delivery.
    pub fn pending_changes(&self) -> StoreResult<usize> {
        self.outbox.pending_count()
    }

    /// Entries that exhausted their retry budget, for the host to surface.
    pub fn failed_items(&self) -> StoreResult<Vec<OutboxEntry>> {
        self.outbox.abandoned()
    }

    /// When the last drain pass finished.
    #[must_use]
    pub fn last_sync_time(&self) -> Option<DateTime<Utc>> {
        self.driver.last_sync_time()
    }

    /// Manually triggers a drain pass (pull-to-refresh).
    pub async fn sync_now(&self) -> SyncResult<SyncOutcome> {
        self.service.sync_now().await
    }

    /// Bulk-pulls every synced collection from the server. Fails fast when
    /// offline; used on first run and manual refresh.
    pub async fn download_from_server(&self) -> SyncResult<usize> {
        self.driver.download_from_server(&EntityKind::ALL).await
    }
}
