//! Error types for the sync layer.

use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur in sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Network error (connection reset, DNS failure, 5xx).
    #[error("network error: {0}")]
    Network(String),

    /// Remote call exceeded its timeout.
    #[error("operation timed out")]
    Timeout,

    /// The remote rejected the request (4xx).
    #[error("remote rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Operation requires connectivity and the device is offline.
    #[error("device is offline")]
    Offline,

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Local store error.
    #[error("storage error: {0}")]
    Storage(#[from] skillpath_store::StoreError),

    /// Internal runtime failure (e.g. a blocking task panicked).
    #[error("internal error: {0}")]
    Internal(String),
}

impl SyncError {
    /// Whether retrying later could plausibly succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, SyncError::Network(_) | SyncError::Timeout)
    }
}
