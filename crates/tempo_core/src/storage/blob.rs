//! Blob store contract and implementations.
//!
//! The store treats persistence as an opaque keyed blob: load once on open,
//! save the whole serialized dataset on every mutation.

use super::{open_db, open_db_in_memory, StorageResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::RefCell;
use std::path::Path;

/// Fixed storage name the application dataset is keyed under.
pub const DATASET_KEY: &str = "tempo-storage";

/// Opaque load/save interface consumed by the store.
pub trait BlobStore {
    /// Returns the stored blob, or `None` when nothing was saved yet.
    fn load(&self) -> StorageResult<Option<String>>;
    /// Replaces the stored blob atomically.
    fn save(&self, blob: &str) -> StorageResult<()>;
}

/// SQLite-backed blob store: one row in the `datasets` table per key.
pub struct SqliteBlobStore {
    conn: Connection,
    key: String,
}

impl SqliteBlobStore {
    /// Opens (creating if needed) a database file and migrates its schema.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Ok(Self {
            conn: open_db(path)?,
            key: DATASET_KEY.to_string(),
        })
    }

    /// In-memory variant; contents vanish when the value is dropped.
    pub fn open_in_memory() -> StorageResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
            key: DATASET_KEY.to_string(),
        })
    }

    /// Uses a caller-managed connection and a non-default key.
    pub fn with_key(conn: Connection, key: impl Into<String>) -> Self {
        Self {
            conn,
            key: key.into(),
        }
    }
}

impl BlobStore for SqliteBlobStore {
    fn load(&self) -> StorageResult<Option<String>> {
        let blob = self
            .conn
            .query_row(
                "SELECT blob FROM datasets WHERE name = ?1;",
                [self.key.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(blob)
    }

    fn save(&self, blob: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO datasets (name, blob, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now') * 1000)
             ON CONFLICT(name) DO UPDATE SET
                blob = excluded.blob,
                updated_at = excluded.updated_at;",
            params![self.key.as_str(), blob],
        )?;
        Ok(())
    }
}

/// Volatile blob store for tests and previews.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blob: RefCell<Option<String>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with an existing blob, as if previously saved.
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: RefCell::new(Some(blob.into())),
        }
    }
}

impl BlobStore for MemoryBlobStore {
    fn load(&self) -> StorageResult<Option<String>> {
        Ok(self.blob.borrow().clone())
    }

    fn save(&self, blob: &str) -> StorageResult<()> {
        *self.blob.borrow_mut() = Some(blob.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_blob_store_round_trips() {
        let store = SqliteBlobStore::open_in_memory().unwrap();
        assert_eq!(store.load().unwrap(), None);

        store.save("{\"people\":[]}").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("{\"people\":[]}"));

        store.save("{}").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn keys_are_isolated() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteBlobStore::with_key(conn, "other");
        store.save("x").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("x"));
    }
}
