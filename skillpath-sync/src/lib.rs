//! Offline-first sync engine for Skillpath.
//!
//! Lets the app function fully offline and reconcile state once
//! connectivity returns.
//!
//! # Architecture
//!
//! - **Outbox**: durable queue of pending local mutations, persisted in the
//!   `sync_status` collection of the local store
//! - **Connectivity**: online/offline state machine with one event stream
//!   fed by both the platform signal and a periodic reachability probe
//! - **Remote**: the narrow capability the driver calls through
//!   (`submit` per mutation, `pull_all` for bulk refresh)
//! - **Driver**: drains the outbox under mutual exclusion with bounded
//!   per-call timeouts
//! - **Service**: the background loop reacting to connectivity transitions
//!   and the periodic sweep timer
//!
//! # Sync Process
//!
//! 1. A domain service writes locally and enqueues an outbox entry in the
//!    same store transaction
//! 2. Going online (or the periodic timer) triggers a drain pass
//! 3. Entries are submitted sequentially, oldest first; successes are
//!    marked synced, failures recorded for retry
//! 4. Entries that exhaust a configured retry budget are abandoned and
//!    surfaced to the host
//!
//! # Example
//!
//! ```no_run
//! use skillpath_store::LocalStore;
//! use skillpath_sync::{
//!     ConnectivityMonitor, HttpRemoteApi, HttpRemoteConfig, Outbox, SyncConfig, SyncDriver,
//! };
//! use std::sync::Arc;
//!
//! let store = LocalStore::open_in_memory().unwrap();
//! let outbox = Outbox::new(store.clone());
//! let monitor = Arc::new(ConnectivityMonitor::new(false));
//! let remote = Arc::new(HttpRemoteApi::new(HttpRemoteConfig::default()));
//!
//! let driver = SyncDriver::new(store, outbox, monitor, remote, SyncConfig::default());
//! ```

pub mod connectivity;
mod driver;
mod error;
pub mod http;
mod outbox;
pub mod remote;
mod service;

pub use connectivity::{ConnectivityMonitor, HttpProbe, ReachabilityProbe};
pub use driver::{SyncConfig, SyncDriver, SyncOutcome, SyncReport};
pub use error::{SyncError, SyncResult};
pub use http::{HttpRemoteApi, HttpRemoteConfig};
pub use outbox::{Outbox, OUTBOX_COLLECTION};
pub use remote::RemoteApi;
pub use service::SyncService;
