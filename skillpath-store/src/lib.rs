//! SQLite storage layer for Skillpath.
//!
//! Provides the durable local store every other component depends on:
//! named record collections over a single SQLite database, with JSON rows
//! and schema-free records. Typing lives at the caller; the store only
//! guarantees durability, id uniqueness per collection, and atomicity.
//!
//! # Architecture
//!
//! - Records are stored as JSON blobs keyed by `(collection, id)`
//! - Insertion order (rowid) is the default iteration order
//! - Multi-operation transactions make a domain write and its outbox
//!   enqueue a single atomic unit

mod error;
mod local_store;

pub use error::{StoreError, StoreResult};
pub use local_store::{LocalStore, OrderBy, StoreTx, StoredRecord};

/// Open a SQLite connection with stale WAL recovery.
///
/// If the initial open fails and a `-wal` file exists alongside the
/// database, it is removed and the open is retried once. This handles the
/// common case where an unclean shutdown leaves a WAL file that prevents
/// reopening.
pub fn open_sqlite_with_wal_recovery(path: &std::path::Path) -> StoreResult<rusqlite::Connection> {
    match rusqlite::Connection::open(path) {
        Ok(conn) => Ok(conn),
        Err(first_err) => {
            let mut wal_name = path.as_os_str().to_os_string();
            wal_name.push("-wal");
            let wal_path = std::path::PathBuf::from(wal_name);
            if wal_path.exists() {
                eprintln!(
                    "[WARN] SQLite open failed, removing stale WAL and retrying: {}",
                    wal_path.display()
                );
                if std::fs::remove_file(&wal_path).is_ok() {
                    return rusqlite::Connection::open(path).map_err(Into::into);
                }
            }
            Err(first_err.into())
        }
    }
}
