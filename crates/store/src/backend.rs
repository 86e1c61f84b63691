use crate::StoreError;
use std::sync::RwLock;

#[cfg(feature = "backend-redb")]
mod redb;
#[cfg(feature = "backend-redb")]
pub use self::redb::RedbBackend;

/// Trait for a key-value storage backend for the record store.
///
/// Keys are namespaced by record kind (`"policy/<id>"`, `"wording/<id>"`,
/// ...), so a prefix scan enumerates one table.
pub trait StoreBackend: Send + Sync {
    /// Insert or update a key-value pair.
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;
    /// Retrieve a value by key.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
    /// Delete a key-value pair.
    fn delete(&self, key: &str) -> Result<(), StoreError>;
    /// Scan all entries whose key starts with `prefix`, calling the visitor
    /// for each one.
    fn scan_prefix(
        &self,
        prefix: &str,
        visitor: &mut dyn FnMut(&str, &[u8]) -> Result<(), StoreError>,
    ) -> Result<(), StoreError>;
    /// Flush any buffered writes to the backend.
    fn flush(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Configuration for selecting and building a backend.
///
/// # Example
/// ```
/// use store::BackendConfig;
///
/// // In-memory (for testing)
/// let config = BackendConfig::in_memory();
///
/// // Redb (pure Rust, recommended for deployments)
/// let config = BackendConfig::redb("/data/covercheck.redb");
/// ```
#[derive(Clone, Debug, Default)]
pub enum BackendConfig {
    /// Use redb for storage; `path` is the database file path.
    ///
    /// Redb is a pure Rust embedded database with ACID transactions and no
    /// external dependencies. Requires the `backend-redb` feature (enabled
    /// by default).
    Redb { path: String },
    /// Use an in-memory HashMap. Useful for testing.
    #[default]
    InMemory,
}

impl BackendConfig {
    /// Create an in-memory backend configuration.
    pub fn in_memory() -> Self {
        BackendConfig::InMemory
    }

    /// Create a redb backend configuration for the given database path.
    pub fn redb<P: Into<String>>(path: P) -> Self {
        BackendConfig::Redb { path: path.into() }
    }

    /// Build the backend based on the configuration.
    pub fn build(&self) -> Result<Box<dyn StoreBackend>, StoreError> {
        match self {
            BackendConfig::InMemory => Ok(Box::new(InMemoryBackend::new())),
            BackendConfig::Redb { path } => {
                #[cfg(feature = "backend-redb")]
                {
                    Ok(Box::new(RedbBackend::open(path)?))
                }
                #[cfg(not(feature = "backend-redb"))]
                {
                    let _ = path;
                    Err(StoreError::backend("redb backend disabled at compile time"))
                }
            }
        }
    }
}

/// An in-memory backend using a `RwLock` around a `BTreeMap`.
///
/// The ordered map keeps prefix scans deterministic, which the matcher's
/// diagnostic payloads rely on.
pub struct InMemoryBackend {
    records: RwLock<std::collections::BTreeMap<String, Vec<u8>>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(std::collections::BTreeMap::new()),
        }
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreBackend for InMemoryBackend {
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.records
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))?
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let guard = self
            .records
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        Ok(guard.get(key).cloned())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.records
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))?
            .remove(key);
        Ok(())
    }

    fn scan_prefix(
        &self,
        prefix: &str,
        visitor: &mut dyn FnMut(&str, &[u8]) -> Result<(), StoreError>,
    ) -> Result<(), StoreError> {
        // A read lock is held for the duration of the scan.
        let guard = self
            .records
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        for (key, value) in guard.range(prefix.to_string()..) {
            if !key.starts_with(prefix) {
                break;
            }
            visitor(key, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_roundtrip() {
        let backend = InMemoryBackend::new();
        backend.put("policy/p-1", b"one").unwrap();
        assert_eq!(backend.get("policy/p-1").unwrap(), Some(b"one".to_vec()));
        assert_eq!(backend.get("policy/p-2").unwrap(), None);

        backend.delete("policy/p-1").unwrap();
        assert_eq!(backend.get("policy/p-1").unwrap(), None);
    }

    #[test]
    fn prefix_scan_is_scoped_and_ordered() {
        let backend = InMemoryBackend::new();
        backend.put("policy/p-2", b"two").unwrap();
        backend.put("policy/p-1", b"one").unwrap();
        backend.put("wording/w-1", b"w").unwrap();

        let mut keys = Vec::new();
        backend
            .scan_prefix("policy/", &mut |key, _value| {
                keys.push(key.to_string());
                Ok(())
            })
            .unwrap();

        assert_eq!(keys, vec!["policy/p-1", "policy/p-2"]);
    }
}
