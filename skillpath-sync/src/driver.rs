//! Sync driver — drains the outbox against the remote API.
//!
//! One pass runs at a time; overlapping triggers (periodic timer,
//! connectivity transition, manual refresh) are coalesced, not queued.
//! Entries are processed sequentially so per-entity mutation order is
//! preserved, and an individual remote failure never aborts the batch.

use crate::connectivity::ConnectivityMonitor;
use crate::error::{SyncError, SyncResult};
use crate::outbox::Outbox;
use crate::remote::RemoteApi;
use chrono::{DateTime, Utc};
use skillpath_store::{LocalStore, StoreResult};
use skillpath_types::{EntityKind, MutationPayload, OutboxStatus};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Configuration for the sync driver and its service loop.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Periodic background sweep interval.
    pub sync_interval: Duration,
    /// Reachability probe interval.
    pub probe_interval: Duration,
    /// Timeout for a single remote call.
    pub remote_timeout: Duration,
    /// Retry budget per entry; `None` retries indefinitely.
    pub max_attempts: Option<u32>,
    /// Entries per drain; `None` drains everything pending.
    pub batch_size: Option<usize>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            sync_interval: Duration::from_secs(5 * 60),
            probe_interval: Duration::from_secs(5 * 60),
            remote_timeout: Duration::from_secs(30),
            max_attempts: None,
            batch_size: None,
        }
    }
}

/// What one drain pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Entries taken from the outbox this pass.
    pub attempted: usize,
    /// Entries delivered and marked synced.
    pub synced: usize,
    /// Entries that failed and stay pending.
    pub failed: usize,
    /// Entries that exhausted their retry budget this pass.
    pub abandoned: usize,
}

/// Outcome of a sync trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The device is offline; nothing was attempted.
    Offline,
    /// Another pass is running; this trigger was dropped.
    AlreadyInProgress,
    /// A drain pass ran to completion.
    Completed(SyncReport),
}

/// Reconciles the outbox with the remote system.
pub struct SyncDriver {
    store: LocalStore,
    outbox: Outbox,
    monitor: Arc<ConnectivityMonitor>,
    remote: Arc<dyn RemoteApi>,
    config: SyncConfig,
    sync_in_progress: AtomicBool,
    last_sync: Mutex<Option<DateTime<Utc>>>,
}

impl SyncDriver {
    /// Creates a driver with injected dependencies.
    pub fn new(
        store: LocalStore,
        outbox: Outbox,
        monitor: Arc<ConnectivityMonitor>,
        remote: Arc<dyn RemoteApi>,
        config: SyncConfig,
    ) -> Self {
        Self {
            store,
            outbox,
            monitor,
            remote,
            config,
            sync_in_progress: AtomicBool::new(false),
            last_sync: Mutex::new(None),
        }
    }

    /// The driver's configuration.
    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Whether a drain pass is currently running.
    #[must_use]
    pub fn is_syncing(&self) -> bool {
        self.sync_in_progress.load(Ordering::SeqCst)
    }

    /// When the last drain pass finished, if any.
    #[must_use]
    pub fn last_sync_time(&self) -> Option<DateTime<Utc>> {
        *self.last_sync.lock().unwrap()
    }

    /// Drains pending outbox entries against the remote API.
    ///
    /// No-op if offline or a pass is already in progress. Individual remote
    /// failures are recorded on the entry and never propagate; store errors
    /// are hard errors and do.
    pub async fn sync_pending_changes(&self) -> SyncResult<SyncOutcome> {
        if !self.monitor.is_online() {
            debug!("skipping sync: offline");
            return Ok(SyncOutcome::Offline);
        }
        if self
            .sync_in_progress
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("skipping sync: already in progress");
            return Ok(SyncOutcome::AlreadyInProgress);
        }
        // Released on every exit path, including store errors.
        let _guard = DrainGuard {
            flag: &self.sync_in_progress,
        };

        let outbox = self.outbox.clone();
        let batch_size = self.config.batch_size;
        let pending = tokio::task::spawn_blocking(move || outbox.pending(batch_size))
            .await
            .map_err(join_error)??;

        if !pending.is_empty() {
            info!(count = pending.len(), "draining outbox");
        }

        let mut report = SyncReport::default();
        for entry in pending {
            report.attempted += 1;
            let result = tokio::time::timeout(
                self.config.remote_timeout,
                self.remote.submit(entry.action, &entry.payload),
            )
            .await;

            match result {
                Ok(Ok(())) => {
                    let outbox = self.outbox.clone();
                    let id = entry.id;
                    tokio::task::spawn_blocking(move || outbox.mark_synced(&id))
                        .await
                        .map_err(join_error)??;
                    report.synced += 1;
                    debug!(entry = %entry.id, entity = %entry.entity_kind, "entry synced");
                }
                Ok(Err(e)) => {
                    warn!(entry = %entry.id, error = %e, "sync attempt failed");
                    self.note_failure(&mut report, entry.id).await?;
                }
                Err(_elapsed) => {
                    warn!(entry = %entry.id, "sync attempt timed out");
                    self.note_failure(&mut report, entry.id).await?;
                }
            }
        }

        *self.last_sync.lock().unwrap() = Some(Utc::now());
        info!(
            synced = report.synced,
            failed = report.failed,
            abandoned = report.abandoned,
            "drain pass finished"
        );
        Ok(SyncOutcome::Completed(report))
    }

    async fn note_failure(
        &self,
        report: &mut SyncReport,
        id: skillpath_types::EntryId,
    ) -> SyncResult<()> {
        let outbox = self.outbox.clone();
        let max_attempts = self.config.max_attempts;
        let status = tokio::task::spawn_blocking(move || outbox.record_failure(&id, max_attempts))
            .await
            .map_err(join_error)??;
        match status {
            OutboxStatus::Abandoned => {
                warn!(entry = %id, "entry abandoned after exhausting retry budget");
                report.abandoned += 1;
            }
            _ => report.failed += 1,
        }
        Ok(())
    }

    /// Bulk-pulls remote records and reconciles them into the local store
    /// by last-writer-wins on `updated_at`. Returns the number of records
    /// written locally.
    ///
    /// Hard precondition: fails fast with [`SyncError::Offline`] when the
    /// device is offline; no store writes occur. Unlike the drain path,
    /// errors here propagate, since this backs an explicit user action.
    pub async fn download_from_server(&self, kinds: &[EntityKind]) -> SyncResult<usize> {
        if !self.monitor.is_online() {
            return Err(SyncError::Offline);
        }

        let payloads = self.remote.pull_all(kinds).await?;
        info!(count = payloads.len(), "pulled records from server");

        let store = self.store.clone();
        let applied = tokio::task::spawn_blocking(move || apply_pulled(&store, payloads))
            .await
            .map_err(join_error)??;

        info!(applied, "applied pulled records");
        Ok(applied)
    }
}

struct DrainGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

fn join_error(e: tokio::task::JoinError) -> SyncError {
    SyncError::Internal(format!("blocking task panicked: {e}"))
}

/// Writes pulled records into the store, last-writer-wins by `updated_at`:
/// absent locally means insert, a newer remote copy replaces the local one,
/// a local copy at least as new is kept.
fn apply_pulled(store: &LocalStore, payloads: Vec<MutationPayload>) -> StoreResult<usize> {
    let mut applied = 0;
    for payload in payloads {
        let collection = payload.kind().collection();
        let id = payload.record_id().to_string();
        let value = payload.record_value()?;

        match store.find_by_id(collection, &id)? {
            None => {
                store.insert(collection, &id, &value)?;
                applied += 1;
            }
            Some(local) => {
                if payload.updated_at() > local_updated_at(&local.data) {
                    store.update_by_id(collection, &id, &value)?;
                    applied += 1;
                }
            }
        }
    }
    Ok(applied)
}

/// The record's own `updated_at`, falling back to the epoch when missing
/// or unparsable so a well-formed remote copy wins.
fn local_updated_at(data: &serde_json::Value) -> DateTime<Utc> {
    data.get("updated_at")
        .and_then(|v| v.as_str())
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
