//! The storage backend contract and the in-memory implementation.

use std::collections::HashMap;

use crate::StoreError;

/// A synchronous string key-value store.
///
/// This is the seam between session logic and the persistence medium.
/// The store above it only ever uses one fixed key, but the contract is a
/// general key-value one so a backend can be shared with other state.
///
/// All three operations are synchronous and expected to be fast local
/// work; a backend must never perform network calls.
pub trait StorageBackend: Send {
    /// Reads the value under `key`. `Ok(None)` when the key is absent.
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Writes `value` under `key`, replacing any previous value.
    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Deletes the value under `key`. Deleting an absent key succeeds.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// A `HashMap`-backed store. State lives and dies with the process.
///
/// The default backend for tests and for applications that only need
/// in-session timeout tracking without persistence across restarts.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    values: HashMap<String, String>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.values.remove(key);
        Ok(())
    }
}
