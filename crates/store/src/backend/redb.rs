//! Redb backend implementation for Covercheck record storage.
//!
//! Redb is a pure Rust embedded key-value store with ACID transactions and
//! MVCC, crash-safe by default and without external dependencies.

use super::StoreBackend;
use crate::StoreError;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;

/// Single table holding every record, keyed by `"<kind>/<id>"`.
const RECORDS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("covercheck_records");

/// Redb backend for persistent record storage.
///
/// All operations are atomic and durable by default. The `Arc<Database>`
/// wrapper allows safe sharing across threads; redb handles its own internal
/// locking and MVCC.
pub struct RedbBackend {
    db: Arc<Database>,
}

impl RedbBackend {
    /// Open or create a redb database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = Database::create(path).map_err(|e| StoreError::backend(e.to_string()))?;

        // Accessing the table inside a write txn creates it if absent.
        let write_txn = db
            .begin_write()
            .map_err(|e| StoreError::backend(e.to_string()))?;
        {
            let _table = write_txn
                .open_table(RECORDS_TABLE)
                .map_err(|e| StoreError::backend(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| StoreError::backend(e.to_string()))?;

        Ok(Self { db: Arc::new(db) })
    }
}

impl StoreBackend for RedbBackend {
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| StoreError::backend(e.to_string()))?;

        {
            let mut table = write_txn
                .open_table(RECORDS_TABLE)
                .map_err(|e| StoreError::backend(e.to_string()))?;
            table
                .insert(key, value)
                .map_err(|e| StoreError::backend(e.to_string()))?;
        }

        write_txn
            .commit()
            .map_err(|e| StoreError::backend(e.to_string()))?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| StoreError::backend(e.to_string()))?;
        let table = read_txn
            .open_table(RECORDS_TABLE)
            .map_err(|e| StoreError::backend(e.to_string()))?;

        match table
            .get(key)
            .map_err(|e| StoreError::backend(e.to_string()))?
        {
            Some(value) => Ok(Some(value.value().to_vec())),
            None => Ok(None),
        }
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| StoreError::backend(e.to_string()))?;

        {
            let mut table = write_txn
                .open_table(RECORDS_TABLE)
                .map_err(|e| StoreError::backend(e.to_string()))?;
            table
                .remove(key)
                .map_err(|e| StoreError::backend(e.to_string()))?;
        }

        write_txn
            .commit()
            .map_err(|e| StoreError::backend(e.to_string()))?;
        Ok(())
    }

    fn scan_prefix(
        &self,
        prefix: &str,
        visitor: &mut dyn FnMut(&str, &[u8]) -> Result<(), StoreError>,
    ) -> Result<(), StoreError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| StoreError::backend(e.to_string()))?;
        let table = read_txn
            .open_table(RECORDS_TABLE)
            .map_err(|e| StoreError::backend(e.to_string()))?;

        // Keys are ordered, so the range starting at the prefix ends as soon
        // as a key stops matching.
        for item in table
            .range(prefix..)
            .map_err(|e| StoreError::backend(e.to_string()))?
        {
            let (key, value) = item.map_err(|e| StoreError::backend(e.to_string()))?;
            let key = key.value();
            if !key.starts_with(prefix) {
                break;
            }
            visitor(key, value.value())?;
        }

        Ok(())
    }

    fn flush(&self) -> Result<(), StoreError> {
        // Redb commits are synchronous, so flush is a no-op.
        Ok(())
    }
}
