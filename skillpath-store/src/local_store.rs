//! Generic collection store over SQLite.
//!
//! A single `records` table holds every collection; rows are JSON blobs
//! keyed by `(collection, id)`. All operations serialize through the
//! connection mutex, so concurrent partial-field updates cannot interleave
//! and readers never observe a half-written record.

use crate::error::{StoreError, StoreResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde_json::Value;
use std::cmp::Ordering;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// A row read back from the store: untyped JSON plus store-managed
/// timestamps.
#[derive(Debug, Clone)]
pub struct StoredRecord {
    /// The record id within its collection.
    pub id: String,
    /// The record body.
    pub data: Value,
    /// When the row was inserted.
    pub created_at: DateTime<Utc>,
    /// When the row was last written.
    pub updated_at: DateTime<Utc>,
}

/// Ordering for [`LocalStore::find_many`] and friends.
#[derive(Debug, Clone, Default)]
pub enum OrderBy {
    /// Insertion order (rowid). The default.
    #[default]
    Insertion,
    /// Order by a top-level JSON field of the record body.
    Field {
        name: String,
        descending: bool,
    },
}

impl OrderBy {
    /// Ascending order by a top-level JSON field.
    #[must_use]
    pub fn field(name: impl Into<String>) -> Self {
        OrderBy::Field {
            name: name.into(),
            descending: false,
        }
    }

    /// Descending order by a top-level JSON field.
    #[must_use]
    pub fn field_desc(name: impl Into<String>) -> Self {
        OrderBy::Field {
            name: name.into(),
            descending: true,
        }
    }
}

/// Durable local store over named record collections.
///
/// Cloneable via `Arc`; one instance owns one SQLite connection.
pub struct LocalStore {
    conn: Arc<Mutex<Connection>>,
}

impl LocalStore {
    /// Opens (or creates) a store at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = crate::open_sqlite_with_wal_recovery(path)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Opens an in-memory store (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS records (
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                data TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (collection, id)
            );

            CREATE INDEX IF NOT EXISTS idx_records_collection
                ON records (collection);
            ",
        )?;
        Ok(())
    }

    // ── Writes ───────────────────────────────────────────────────

    /// Inserts a record. Fails with [`StoreError::Constraint`] if a record
    /// with the same id already exists in the collection.
    pub fn insert(&self, collection: &str, id: &str, data: &Value) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        insert_row(&conn, collection, id, data)
    }

    /// Applies a partial field merge to all records matching the predicate.
    /// Returns the number of updated rows; zero matches is a no-op, not an
    /// error.
    pub fn update(
        &self,
        collection: &str,
        patch: &Value,
        predicate: impl Fn(&Value) -> bool,
    ) -> StoreResult<usize> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let rows = load_rows(&tx, collection)?;
        let mut updated = 0;
        for row in rows {
            if predicate(&row.data) {
                write_patched_row(&tx, collection, &row, patch)?;
                updated += 1;
            }
        }
        tx.commit()?;
        Ok(updated)
    }

    /// Applies a partial field merge to the record with the given id.
    /// Returns `false` (not an error) if the record does not exist.
    pub fn update_by_id(&self, collection: &str, id: &str, patch: &Value) -> StoreResult<bool> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let changed = update_row_by_id(&tx, collection, id, patch)?;
        tx.commit()?;
        Ok(changed)
    }

    /// Deletes all records matching the predicate. Returns the number of
    /// deleted rows; zero matches is a no-op.
    pub fn delete(
        &self,
        collection: &str,
        predicate: impl Fn(&Value) -> bool,
    ) -> StoreResult<usize> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let rows = load_rows(&tx, collection)?;
        let mut deleted = 0;
        for row in rows {
            if predicate(&row.data) {
                tx.execute(
                    "DELETE FROM records WHERE collection = ?1 AND id = ?2",
                    params![collection, row.id],
                )?;
                deleted += 1;
            }
        }
        tx.commit()?;
        Ok(deleted)
    }

    /// Deletes the record with the given id. Returns `false` if absent.
    pub fn delete_by_id(&self, collection: &str, id: &str) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();
        let n = conn.execute(
            "DELETE FROM records WHERE collection = ?1 AND id = ?2",
            params![collection, id],
        )?;
        Ok(n > 0)
    }

    // ── Reads ────────────────────────────────────────────────────

    /// Returns the first record matching the predicate, in insertion order.
    pub fn find_one(
        &self,
        collection: &str,
        predicate: impl Fn(&Value) -> bool,
    ) -> StoreResult<Option<StoredRecord>> {
        let conn = self.conn.lock().unwrap();
        let rows = load_rows(&conn, collection)?;
        Ok(rows.into_iter().find(|r| predicate(&r.data)))
    }

    /// Returns the record with the given id, if any.
    pub fn find_by_id(&self, collection: &str, id: &str) -> StoreResult<Option<StoredRecord>> {
        let conn = self.conn.lock().unwrap();
        find_row_by_id(&conn, collection, id)
    }

    /// Returns the full collection in the given order.
    pub fn find_many(&self, collection: &str, order: OrderBy) -> StoreResult<Vec<StoredRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut rows = load_rows(&conn, collection)?;
        sort_rows(&mut rows, &order);
        Ok(rows)
    }

    /// Returns all records matching the predicate, in the given order.
    pub fn find_where(
        &self,
        collection: &str,
        predicate: impl Fn(&Value) -> bool,
        order: OrderBy,
    ) -> StoreResult<Vec<StoredRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut rows = load_rows(&conn, collection)?;
        rows.retain(|r| predicate(&r.data));
        sort_rows(&mut rows, &order);
        Ok(rows)
    }

    /// Returns the number of records in the collection.
    pub fn count(&self, collection: &str) -> StoreResult<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM records WHERE collection = ?1",
            params![collection],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Returns the number of records matching the predicate.
    pub fn count_where(
        &self,
        collection: &str,
        predicate: impl Fn(&Value) -> bool,
    ) -> StoreResult<usize> {
        let conn = self.conn.lock().unwrap();
        let rows = load_rows(&conn, collection)?;
        Ok(rows.iter().filter(|r| predicate(&r.data)).count())
    }

    // ── Transactions ─────────────────────────────────────────────

    /// Runs several row operations as one atomic unit.
    ///
    /// Commits when the closure returns `Ok`, rolls back on `Err`. This is
    /// what lets a domain write and its outbox enqueue share a transaction.
    pub fn transaction<T>(
        &self,
        f: impl FnOnce(&StoreTx<'_>) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let result = {
            let store_tx = StoreTx { conn: &tx };
            f(&store_tx)
        };
        match result {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            // Dropping the transaction rolls it back.
            Err(e) => Err(e),
        }
    }
}

impl Clone for LocalStore {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
        }
    }
}

/// Row operations available inside a [`LocalStore::transaction`] closure.
pub struct StoreTx<'a> {
    conn: &'a Connection,
}

impl StoreTx<'_> {
    /// Inserts a record; see [`LocalStore::insert`].
    pub fn insert(&self, collection: &str, id: &str, data: &Value) -> StoreResult<()> {
        insert_row(self.conn, collection, id, data)
    }

    /// Partial field merge by id; see [`LocalStore::update_by_id`].
    pub fn update_by_id(&self, collection: &str, id: &str, patch: &Value) -> StoreResult<bool> {
        update_row_by_id(self.conn, collection, id, patch)
    }

    /// Deletes by id; see [`LocalStore::delete_by_id`].
    pub fn delete_by_id(&self, collection: &str, id: &str) -> StoreResult<bool> {
        let n = self.conn.execute(
            "DELETE FROM records WHERE collection = ?1 AND id = ?2",
            params![collection, id],
        )?;
        Ok(n > 0)
    }

    /// Reads by id; see [`LocalStore::find_by_id`].
    pub fn find_by_id(&self, collection: &str, id: &str) -> StoreResult<Option<StoredRecord>> {
        find_row_by_id(self.conn, collection, id)
    }
}

// ── Row helpers (shared by LocalStore and StoreTx) ───────────────

fn insert_row(conn: &Connection, collection: &str, id: &str, data: &Value) -> StoreResult<()> {
    let now = Utc::now().to_rfc3339();
    let body = serde_json::to_string(data)?;
    conn.execute(
        "INSERT INTO records (collection, id, data, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![collection, id, body, now, now],
    )
    .map_err(|e| match e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            StoreError::Constraint(format!("duplicate id {id} in collection {collection}"))
        }
        other => StoreError::Database(other),
    })?;
    Ok(())
}

fn update_row_by_id(
    conn: &Connection,
    collection: &str,
    id: &str,
    patch: &Value,
) -> StoreResult<bool> {
    match find_row_by_id(conn, collection, id)? {
        Some(row) => {
            write_patched_row(conn, collection, &row, patch)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

fn write_patched_row(
    conn: &Connection,
    collection: &str,
    row: &StoredRecord,
    patch: &Value,
) -> StoreResult<()> {
    let mut data = row.data.clone();
    merge_fields(&mut data, patch);
    let body = serde_json::to_string(&data)?;
    conn.execute(
        "UPDATE records SET data = ?1, updated_at = ?2 WHERE collection = ?3 AND id = ?4",
        params![body, Utc::now().to_rfc3339(), collection, row.id],
    )?;
    Ok(())
}

fn find_row_by_id(
    conn: &Connection,
    collection: &str,
    id: &str,
) -> StoreResult<Option<StoredRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, data, created_at, updated_at FROM records
         WHERE collection = ?1 AND id = ?2",
    )?;
    let mut rows = stmt.query_map(params![collection, id], read_raw_row)?;
    match rows.next() {
        Some(raw) => Ok(Some(parse_row(raw?)?)),
        None => Ok(None),
    }
}

fn load_rows(conn: &Connection, collection: &str) -> StoreResult<Vec<StoredRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, data, created_at, updated_at FROM records
         WHERE collection = ?1 ORDER BY rowid ASC",
    )?;
    let raw_rows = stmt.query_map(params![collection], read_raw_row)?;
    let mut result = Vec::new();
    for raw in raw_rows {
        result.push(parse_row(raw?)?);
    }
    Ok(result)
}

type RawRow = (String, String, String, String);

fn read_raw_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn parse_row(raw: RawRow) -> StoreResult<StoredRecord> {
    let (id, body, created_at, updated_at) = raw;
    Ok(StoredRecord {
        id,
        data: serde_json::from_str(&body)?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

fn parse_timestamp(s: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::InvalidData(format!("bad timestamp {s}: {e}")))
}

/// Shallow merge: top-level fields of `patch` replace those of `data`.
fn merge_fields(data: &mut Value, patch: &Value) {
    if let (Value::Object(target), Value::Object(fields)) = (data, patch) {
        for (key, value) in fields {
            target.insert(key.clone(), value.clone());
        }
    }
}

fn sort_rows(rows: &mut [StoredRecord], order: &OrderBy) {
    if let OrderBy::Field { name, descending } = order {
        rows.sort_by(|a, b| {
            let ord = cmp_json(
                a.data.get(name.as_str()),
                b.data.get(name.as_str()),
            );
            if *descending { ord.reverse() } else { ord }
        });
    }
}

/// Total order over optional JSON values: missing < null < bool < number
/// < string; other types compare by serialized form.
fn cmp_json(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => match (x, y) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Bool(p), Value::Bool(q)) => p.cmp(q),
            (Value::Number(p), Value::Number(q)) => p
                .as_f64()
                .partial_cmp(&q.as_f64())
                .unwrap_or(Ordering::Equal),
            (Value::String(p), Value::String(q)) => p.cmp(q),
            _ => x.to_string().cmp(&y.to_string()),
        },
    }
}
