//! Remote API abstraction.
//!
//! The sync driver depends only on this narrow capability; the transport
//! behind it (REST, RPC) is owned by the surrounding application. One
//! logical endpoint exists per `(entity kind, action)` pair.

use crate::error::SyncResult;
use async_trait::async_trait;
use skillpath_types::{EntityKind, MutationAction, MutationPayload};

/// The capability the sync driver calls through.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Submits one mutation to the remote system.
    ///
    /// The remote is expected to apply submits idempotently by record id,
    /// since delivery is at-least-once.
    async fn submit(&self, action: MutationAction, payload: &MutationPayload) -> SyncResult<()>;

    /// Bulk-pulls all remote records of the given kinds. Used on first run
    /// and manual refresh, never by the drain path.
    async fn pull_all(&self, kinds: &[EntityKind]) -> SyncResult<Vec<MutationPayload>>;
}

/// A scriptable remote for testing.
pub mod mock {
    use super::*;
    use crate::error::SyncError;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records every submit and fails on demand.
    #[derive(Default)]
    pub struct MockRemoteApi {
        calls: Mutex<Vec<(MutationAction, MutationPayload)>>,
        fail_next: AtomicU32,
        always_fail: AtomicBool,
        pull_records: Mutex<Vec<MutationPayload>>,
        submit_delay: Mutex<Option<Duration>>,
    }

    impl MockRemoteApi {
        /// Creates a mock that accepts everything.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Fails the next `n` submits with a network error.
        pub fn fail_next(&self, n: u32) {
            self.fail_next.store(n, Ordering::SeqCst);
        }

        /// Fails every submit until turned off again.
        pub fn set_always_fail(&self, fail: bool) {
            self.always_fail.store(fail, Ordering::SeqCst);
        }

        /// Delays every submit, for overlap tests.
        pub fn set_submit_delay(&self, delay: Duration) {
            *self.submit_delay.lock().unwrap() = Some(delay);
        }

        /// Seeds a record returned by `pull_all`.
        pub fn push_pull_record(&self, payload: MutationPayload) {
            self.pull_records.lock().unwrap().push(payload);
        }

        /// All successfully submitted mutations, in call order.
        #[must_use]
        pub fn calls(&self) -> Vec<(MutationAction, MutationPayload)> {
            self.calls.lock().unwrap().clone()
        }

        /// Number of successful submits.
        #[must_use]
        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl RemoteApi for MockRemoteApi {
        async fn submit(
            &self,
            action: MutationAction,
            payload: &MutationPayload,
        ) -> SyncResult<()> {
            let delay = *self.submit_delay.lock().unwrap();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            if self.always_fail.load(Ordering::SeqCst) {
                return Err(SyncError::Network("injected failure".into()));
            }
            let remaining = self.fail_next.load(Ordering::SeqCst);
            if remaining > 0 {
                self.fail_next.store(remaining - 1, Ordering::SeqCst);
                return Err(SyncError::Network("injected failure".into()));
            }

            self.calls.lock().unwrap().push((action, payload.clone()));
            Ok(())
        }

        async fn pull_all(&self, kinds: &[EntityKind]) -> SyncResult<Vec<MutationPayload>> {
            let records = self.pull_records.lock().unwrap();
            Ok(records
                .iter()
                .filter(|p| kinds.contains(&p.kind()))
                .cloned()
                .collect())
        }
    }
}
