//! The key-value persistence driver.

use async_trait::async_trait;
use log::warn;
use std::sync::Arc;

use satchel_core::{
    driver::{CollectionSnapshot, PersistenceDriver},
    error::StoreResult,
};

use crate::capability::KeyValueStore;

/// Persistence driver over a synchronous [`KeyValueStore`] capability.
///
/// One key per collection, named `<namespace>.<collection>`, holding the
/// JSON-encoded snapshot. Commits replace the entry wholesale.
#[derive(Debug, Clone)]
pub struct KeyValueDriver {
    store: Arc<dyn KeyValueStore>,
}

impl KeyValueDriver {
    /// Creates a driver over the given key-value capability.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

fn storage_key(namespace: &str, collection: &str) -> String {
    format!("{namespace}.{collection}")
}

#[async_trait]
impl PersistenceDriver for KeyValueDriver {
    async fn persist(&self, namespace: &str, snapshot: &CollectionSnapshot) -> StoreResult<()> {
        let encoded = serde_json::to_string(snapshot)?;
        self.store
            .set(&storage_key(namespace, &snapshot.name), encoded);
        Ok(())
    }

    /// Scans every key under the namespace prefix and decodes each entry.
    /// Entries that fail to decode are skipped; the restore is partial
    /// rather than fatal.
    async fn restore(&self, namespace: &str) -> StoreResult<Vec<CollectionSnapshot>> {
        let prefix = format!("{namespace}.");
        let mut snapshots = Vec::new();

        for key in self.store.keys() {
            if !key.starts_with(&prefix) {
                continue;
            }
            let Some(raw) = self.store.get(&key) else {
                continue;
            };
            match serde_json::from_str::<CollectionSnapshot>(&raw) {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(err) => warn!("skipping undecodable entry '{key}': {err}"),
            }
        }

        Ok(snapshots)
    }
}
