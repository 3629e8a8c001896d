//! Offline content tracking.
//!
//! Tracks which large assets (PDFs, media) have a local copy in the
//! `offline_content` collection. Entries have a lifecycle independent of
//! the outbox: created on download, deleted on eviction, never synced.

use chrono::{DateTime, Utc};
use serde_json::json;
use skillpath_store::{LocalStore, OrderBy, StoreResult};
use skillpath_types::{ContentType, OfflineContentRef, RecordId};
use tracing::debug;
use uuid::Uuid;

/// Collection name for offline content references.
pub const OFFLINE_CONTENT_COLLECTION: &str = "offline_content";

/// Manages locally cached copies of remote assets.
pub struct OfflineContentManager {
    store: LocalStore,
}

impl OfflineContentManager {
    /// Creates the manager over the given store.
    #[must_use]
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    /// Records a freshly downloaded asset.
    pub fn register_download(
        &self,
        content_type: ContentType,
        entity_id: RecordId,
        local_path: impl Into<String>,
        original_url: impl Into<String>,
        file_size: u64,
    ) -> StoreResult<OfflineContentRef> {
        let content = OfflineContentRef::new(
            content_type,
            entity_id,
            local_path,
            original_url,
            file_size,
        );
        let value = serde_json::to_value(&content)?;
        self.store
            .insert(OFFLINE_CONTENT_COLLECTION, &content.id.to_string(), &value)?;
        debug!(id = %content.id, size = file_size, "registered offline content");
        Ok(content)
    }

    /// Bumps `last_accessed_at` so eviction prefers cold entries.
    /// No-op if the entry does not exist.
    pub fn touch(&self, id: Uuid) -> StoreResult<()> {
        self.store.update_by_id(
            OFFLINE_CONTENT_COLLECTION,
            &id.to_string(),
            &json!({ "last_accessed_at": Utc::now().to_rfc3339() }),
        )?;
        Ok(())
    }

    /// Evicts one cached asset. Returns whether it existed.
    pub fn evict(&self, id: Uuid) -> StoreResult<bool> {
        self.store
            .delete_by_id(OFFLINE_CONTENT_COLLECTION, &id.to_string())
    }

    /// Evicts every asset last accessed before the cutoff. Returns the
    /// number of evicted entries.
    pub fn evict_older_than(&self, cutoff: DateTime<Utc>) -> StoreResult<usize> {
        self.store.delete(OFFLINE_CONTENT_COLLECTION, |data| {
            data.get("last_accessed_at")
                .and_then(|v| v.as_str())
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .is_some_and(|accessed| accessed.with_timezone(&Utc) < cutoff)
        })
    }

    /// Cached assets for a domain record.
    pub fn for_entity(&self, entity_id: RecordId) -> StoreResult<Vec<OfflineContentRef>> {
        let key = entity_id.to_string();
        let rows = self.store.find_where(
            OFFLINE_CONTENT_COLLECTION,
            |data| data["entity_id"] == key.as_str(),
            OrderBy::Insertion,
        )?;
        rows.into_iter()
            .map(|row| serde_json::from_value(row.data).map_err(Into::into))
            .collect()
    }

    /// Total bytes of cached content.
    pub fn total_size(&self) -> StoreResult<u64> {
        let rows = self
            .store
            .find_many(OFFLINE_CONTENT_COLLECTION, OrderBy::Insertion)?;
        Ok(rows
            .iter()
            .filter_map(|row| row.data.get("file_size").and_then(|v| v.as_u64()))
            .sum())
    }
}
