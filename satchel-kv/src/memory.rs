//! In-process key-value storage.

use parking_lot::RwLock;
use std::collections::HashMap;

use crate::capability::KeyValueStore;

/// Key-value store backed by an in-process hash map.
///
/// This is the default backing store. It keeps everything in memory, which
/// makes persistence survive store destruction and restore cycles within
/// one process, but not process restarts.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.entries.write().insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.entries.write().remove(key);
    }

    fn keys(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }
}
