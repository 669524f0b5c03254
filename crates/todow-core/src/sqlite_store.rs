use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use crate::collection::Collection;
use crate::config::{BUCKET_NAME, COLLECTION_KEY};
use crate::item::{Item, ItemId};
use crate::store::{CollectionStore, StoreError};

/// How long a writer waits for another connection's write lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed implementation of the CollectionStore trait.
///
/// SQLite serves only as a transactional bucket/key/value engine: the whole
/// collection lives as one JSON blob in the `entries` table.
pub struct SqliteCollectionStore {
    conn: Mutex<Connection>,
}

impl SqliteCollectionStore {
    /// Open (or create) a database at the given path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn =
            Connection::open(path).map_err(|e| StoreError::Storage(format!("open: {}", e)))?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })
        .map_err(|e| StoreError::Storage(format!("journal_mode: {}", e)))?;
        Self::init_with_connection(conn)
    }

    /// Create an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::Storage(format!("open_in_memory: {}", e)))?;
        Self::init_with_connection(conn)
    }

    fn init_with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.busy_timeout(BUSY_TIMEOUT)
            .map_err(|e| StoreError::Storage(format!("busy_timeout: {}", e)))?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS buckets (
                name TEXT PRIMARY KEY
            );

            CREATE TABLE IF NOT EXISTS entries (
                bucket TEXT NOT NULL,
                key TEXT NOT NULL,
                value BLOB NOT NULL,
                PRIMARY KEY (bucket, key)
            );
            ",
        )
        .map_err(|e| StoreError::Storage(format!("init_schema: {}", e)))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run `f` inside a write transaction. The transaction commits only if
    /// `f` succeeds; any error rolls it back.
    fn update<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut conn = self.conn.lock().map_err(|e| StoreError::Storage(e.to_string()))?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| StoreError::Storage(format!("begin tx: {}", e)))?;

        let value = f(&tx)?;

        tx.commit()
            .map_err(|e| StoreError::Storage(format!("commit: {}", e)))?;
        Ok(value)
    }

    /// Run `f` against a read snapshot.
    fn view<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut conn = self.conn.lock().map_err(|e| StoreError::Storage(e.to_string()))?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Deferred)
            .map_err(|e| StoreError::Storage(format!("begin tx: {}", e)))?;
        let value = f(&tx)?;
        Ok(value)
    }

    /// Load the existing collection, apply `mutate` and write it back.
    /// A missing bucket or key means the ID cannot exist.
    fn mutate_existing(
        &self,
        id: ItemId,
        mutate: impl FnOnce(&mut Collection) -> Result<(), StoreError>,
    ) -> Result<(), StoreError> {
        self.update(|conn| {
            if !bucket_exists(conn, BUCKET_NAME)? {
                return Err(StoreError::NotFound(id));
            }
            let bytes = get(conn, BUCKET_NAME, COLLECTION_KEY)?.ok_or(StoreError::NotFound(id))?;

            let mut collection = Collection::decode(&bytes)?;
            mutate(&mut collection)?;
            put(conn, BUCKET_NAME, COLLECTION_KEY, &collection.encode()?)
        })
    }
}

impl CollectionStore for SqliteCollectionStore {
    fn load(&self) -> Result<Option<Vec<Item>>, StoreError> {
        self.view(|conn| {
            if !bucket_exists(conn, BUCKET_NAME)? {
                return Ok(None);
            }
            match get(conn, BUCKET_NAME, COLLECTION_KEY)? {
                Some(bytes) => Ok(Some(Collection::decode(&bytes)?.into_items())),
                None => Ok(None),
            }
        })
    }

    fn add(&self, item: &mut Item) -> Result<ItemId, StoreError> {
        self.update(|conn| {
            create_bucket_if_not_exists(conn, BUCKET_NAME)?;

            let mut collection = match get(conn, BUCKET_NAME, COLLECTION_KEY)? {
                Some(bytes) => Collection::decode(&bytes)?,
                None => Collection::new(),
            };
            let id = collection.push(item)?;

            put(conn, BUCKET_NAME, COLLECTION_KEY, &collection.encode()?)?;
            Ok(id)
        })
    }

    fn remove(&self, id: ItemId) -> Result<(), StoreError> {
        self.mutate_existing(id, |collection| collection.remove(id).map(|_| ()))
    }

    fn complete(&self, id: ItemId) -> Result<(), StoreError> {
        self.mutate_existing(id, |collection| collection.complete(id))
    }

    fn all_items(&self) -> Result<Vec<u8>, StoreError> {
        self.view(|conn| {
            if !bucket_exists(conn, BUCKET_NAME)? {
                return Err(StoreError::NoItems);
            }
            get(conn, BUCKET_NAME, COLLECTION_KEY)?.ok_or(StoreError::NoItems)
        })
    }
}

fn bucket_exists(conn: &Connection, bucket: &str) -> Result<bool, StoreError> {
    conn.query_row(
        "SELECT COUNT(*) FROM buckets WHERE name = ?1",
        params![bucket],
        |row| row.get::<_, i64>(0),
    )
    .map(|c| c > 0)
    .map_err(|e| StoreError::Storage(format!("bucket_exists: {}", e)))
}

fn create_bucket_if_not_exists(conn: &Connection, bucket: &str) -> Result<(), StoreError> {
    conn.execute(
        "INSERT OR IGNORE INTO buckets (name) VALUES (?1)",
        params![bucket],
    )
    .map_err(|e| StoreError::Storage(format!("unable to create/get bucket: {}", e)))?;
    Ok(())
}

fn get(conn: &Connection, bucket: &str, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
    conn.query_row(
        "SELECT value FROM entries WHERE bucket = ?1 AND key = ?2",
        params![bucket, key],
        |row| row.get::<_, Vec<u8>>(0),
    )
    .optional()
    .map_err(|e| StoreError::Storage(format!("get: {}", e)))
}

fn put(conn: &Connection, bucket: &str, key: &str, value: &[u8]) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO entries (bucket, key, value) VALUES (?1, ?2, ?3)
         ON CONFLICT (bucket, key) DO UPDATE SET value = excluded.value",
        params![bucket, key, value],
    )
    .map_err(|e| StoreError::Storage(format!("put: {}", e)))?;
    Ok(())
}
