//! Offline content references.
//!
//! Tracks which large assets (PDFs, media) have a local copy. These rows
//! live in the `offline_content` collection and have a lifecycle independent
//! of the outbox: created on download, deleted on eviction, never synced.

use crate::RecordId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The media type of a downloaded asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Pdf,
    Video,
    Audio,
    Image,
}

/// A locally cached copy of a remote asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfflineContentRef {
    /// Unique identifier for this cache entry.
    pub id: Uuid,

    /// What kind of asset the local file is.
    pub content_type: ContentType,

    /// The domain record the asset belongs to (e.g. a lesson).
    pub entity_id: RecordId,

    /// Absolute path of the local copy.
    pub local_path: String,

    /// Where the asset was downloaded from.
    pub original_url: String,

    /// Size of the local copy in bytes.
    pub file_size: u64,

    pub downloaded_at: DateTime<Utc>,

    /// Bumped on every read so eviction can prefer cold entries.
    pub last_accessed_at: DateTime<Utc>,
}

impl OfflineContentRef {
    /// Creates a reference for a freshly downloaded asset.
    #[must_use]
    pub fn new(
        content_type: ContentType,
        entity_id: RecordId,
        local_path: impl Into<String>,
        original_url: impl Into<String>,
        file_size: u64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            content_type,
            entity_id,
            local_path: local_path.into(),
            original_url: original_url.into(),
            file_size,
            downloaded_at: now,
            last_accessed_at: now,
        }
    }

    /// Marks the asset as just accessed.
    pub fn touch(&mut self) {
        self.last_accessed_at = Utc::now();
    }
}
