//! The outbox: a durable queue of pending local mutations.
//!
//! Persisted in the `sync_status` collection of the local store so entries
//! survive restarts and app upgrades. Domain services append entries in the
//! same store transaction as their local write; the sync driver is the only
//! component that mutates them afterwards.

use chrono::Utc;
use serde_json::json;
use skillpath_store::{LocalStore, OrderBy, StoreResult, StoreTx};
use skillpath_types::{EntryId, MutationAction, MutationPayload, OutboxEntry, OutboxStatus};

/// Collection name the outbox is persisted in. Its serialized schema must
/// stay stable across app versions so in-flight entries survive an upgrade.
pub const OUTBOX_COLLECTION: &str = "sync_status";

/// Durable sync queue over the local store.
#[derive(Clone)]
pub struct Outbox {
    store: LocalStore,
}

impl Outbox {
    /// Creates an outbox over the given store.
    #[must_use]
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    /// Appends a pending entry for the given mutation.
    ///
    /// Fails only on store unavailability, never on payload shape.
    pub fn enqueue(
        &self,
        action: MutationAction,
        payload: MutationPayload,
    ) -> StoreResult<OutboxEntry> {
        let entry = OutboxEntry::new(action, payload);
        let value = serde_json::to_value(&entry)?;
        self.store
            .insert(OUTBOX_COLLECTION, &entry.id.to_string(), &value)?;
        Ok(entry)
    }

    /// Appends a pending entry inside a caller-owned store transaction.
    ///
    /// This is how a domain write and its enqueue become a single atomic
    /// unit: a crash between the two can never drop a pending sync.
    pub fn enqueue_in(
        tx: &StoreTx<'_>,
        action: MutationAction,
        payload: MutationPayload,
    ) -> StoreResult<OutboxEntry> {
        let entry = OutboxEntry::new(action, payload);
        let value = serde_json::to_value(&entry)?;
        tx.insert(OUTBOX_COLLECTION, &entry.id.to_string(), &value)?;
        Ok(entry)
    }

    /// Returns pending entries in FIFO order (oldest first), preserving the
    /// causal order of mutations against the same entity. `batch_size`
    /// limits the result; `None` returns everything pending.
    pub fn pending(&self, batch_size: Option<usize>) -> StoreResult<Vec<OutboxEntry>> {
        let rows = self.store.find_where(
            OUTBOX_COLLECTION,
            |data| data["status"] == "pending",
            OrderBy::Insertion,
        )?;
        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            entries.push(serde_json::from_value::<OutboxEntry>(row.data)?);
        }
        if let Some(limit) = batch_size {
            entries.truncate(limit);
        }
        Ok(entries)
    }

    /// Marks an entry as delivered. Idempotent: re-marking a synced entry
    /// (or marking an unknown id) is a no-op.
    pub fn mark_synced(&self, id: &EntryId) -> StoreResult<()> {
        self.store.update_by_id(
            OUTBOX_COLLECTION,
            &id.to_string(),
            &json!({ "status": "synced" }),
        )?;
        Ok(())
    }

    /// Records a failed delivery attempt: increments `sync_attempts` and
    /// stamps `last_sync_attempt`. With `max_attempts` configured, the
    /// entry becomes [`OutboxStatus::Abandoned`] once it has failed that
    /// many times. Returns the entry's status after the update.
    pub fn record_failure(
        &self,
        id: &EntryId,
        max_attempts: Option<u32>,
    ) -> StoreResult<OutboxStatus> {
        let key = id.to_string();
        self.store.transaction(|tx| {
            let Some(row) = tx.find_by_id(OUTBOX_COLLECTION, &key)? else {
                return Ok(OutboxStatus::Pending);
            };
            let entry: OutboxEntry = serde_json::from_value(row.data)?;
            let attempts = entry.sync_attempts.saturating_add(1);
            let status = match max_attempts {
                Some(max) if attempts >= max => OutboxStatus::Abandoned,
                _ => entry.status,
            };
            tx.update_by_id(
                OUTBOX_COLLECTION,
                &key,
                &json!({
                    "sync_attempts": attempts,
                    "last_sync_attempt": Utc::now().to_rfc3339(),
                    "status": status,
                }),
            )?;
            Ok(status)
        })
    }

    /// Returns entries that exceeded their retry budget. These are surfaced
    /// to the host application but never retried automatically.
    pub fn abandoned(&self) -> StoreResult<Vec<OutboxEntry>> {
        let rows = self.store.find_where(
            OUTBOX_COLLECTION,
            |data| data["status"] == "abandoned",
            OrderBy::Insertion,
        )?;
        rows.into_iter()
            .map(|row| serde_json::from_value(row.data).map_err(Into::into))
            .collect()
    }

    /// Number of entries still awaiting delivery. Drives the host's
    /// "pending changes" badge.
    pub fn pending_count(&self) -> StoreResult<usize> {
        self.store
            .count_where(OUTBOX_COLLECTION, |data| data["status"] == "pending")
    }

    /// Looks up a single entry by id.
    pub fn get(&self, id: &EntryId) -> StoreResult<Option<OutboxEntry>> {
        let row = self.store.find_by_id(OUTBOX_COLLECTION, &id.to_string())?;
        match row {
            Some(row) => Ok(Some(serde_json::from_value(row.data)?)),
            None => Ok(None),
        }
    }
}
