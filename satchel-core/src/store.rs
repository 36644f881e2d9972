//! The top-level owner of named collections and the persistence driver.
//!
//! A [`Store`] is constructed through [`Store::builder`]; the driver is
//! resolved at build time, before any collection exists. Collections are
//! created lazily by name and live until the store removes or destroys
//! them.

use log::debug;
use mea::rwlock::RwLock;
use std::collections::HashMap;

use crate::{
    collection::{Collection, CollectionOptions},
    driver::DriverHandle,
    error::{StoreError, StoreResult},
};

/// Store-wide options.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Namespace under which the backing store is keyed
    /// (`<namespace>.<collection>` for key-value drivers).
    pub namespace: String,
    /// Default auto-commit flag for newly created collections.
    pub auto_commit: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            namespace: "satchel".to_string(),
            auto_commit: true,
        }
    }
}

/// The root object owning named collections and the active persistence
/// driver.
#[derive(Debug)]
pub struct Store {
    version: &'static str,
    options: StoreOptions,
    driver: DriverHandle,
    collections: RwLock<HashMap<String, Collection>>,
}

impl Store {
    /// Creates a builder for configuring a store.
    pub fn builder() -> StoreBuilder {
        StoreBuilder::new()
    }

    /// Creates a store over the given driver with default options.
    pub fn new(driver: DriverHandle) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            options: StoreOptions::default(),
            driver,
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// The store version tag.
    pub fn version(&self) -> &str {
        self.version
    }

    /// The options this store was built with.
    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Returns the named collection, lazily creating it with the store's
    /// default options when it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidArgument`] when the name is empty.
    pub async fn collection(&self, name: &str) -> StoreResult<Collection> {
        self.collection_with(name, None).await
    }

    /// Like [`Store::collection`], with per-collection option overrides
    /// applied when the collection is created. Overrides have no effect on
    /// an already existing collection.
    pub async fn collection_with(
        &self,
        name: &str,
        options: Option<CollectionOptions>,
    ) -> StoreResult<Collection> {
        if name.is_empty() {
            return Err(StoreError::InvalidArgument(
                "expected a collection name".to_string(),
            ));
        }

        {
            let collections = self.collections.read().await;
            if let Some(existing) = collections.get(name) {
                return Ok(existing.clone());
            }
        }

        let mut collections = self.collections.write().await;
        let collection = collections.entry(name.to_string()).or_insert_with(|| {
            Collection::new(
                name,
                &self.options.namespace,
                options.unwrap_or(CollectionOptions {
                    auto_commit: self.options.auto_commit,
                }),
                self.driver.clone(),
            )
        });
        Ok(collection.clone())
    }

    /// Whether a collection with this name currently exists in memory.
    pub async fn has_collection(&self, name: &str) -> bool {
        self.collections.read().await.contains_key(name)
    }

    /// Names of all collections currently held by the store.
    pub async fn collection_names(&self) -> Vec<String> {
        self.collections.read().await.keys().cloned().collect()
    }

    /// Destroys and forgets the named collection; a no-op when no such
    /// collection exists.
    pub async fn remove_collection(&self, name: &str) -> StoreResult<&Self> {
        let removed = {
            let mut collections = self.collections.write().await;
            collections.remove(name)
        };
        if let Some(collection) = removed {
            collection.destroy().await?;
        }
        Ok(self)
    }

    /// Commits the named collection through the configured driver; a no-op
    /// when no such collection exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidArgument`] when the name is empty.
    pub async fn commit(&self, name: &str) -> StoreResult<&Self> {
        if name.is_empty() {
            return Err(StoreError::InvalidArgument(
                "expected a collection name".to_string(),
            ));
        }
        let collection = {
            let collections = self.collections.read().await;
            collections.get(name).cloned()
        };
        if let Some(collection) = collection {
            collection.commit().await?;
        }
        Ok(self)
    }

    /// Bulk-loads every snapshot the driver finds under the store's
    /// namespace and registers a collection per snapshot, replacing any
    /// in-memory collection of the same name.
    ///
    /// What counts as a recoverable failure is driver-dependent: snapshots
    /// that cannot be decoded are skipped, backend errors abort the
    /// restore.
    pub async fn restore(&self) -> StoreResult<&Self> {
        let snapshots = self.driver.restore(&self.options.namespace).await?;

        let mut collections = self.collections.write().await;
        for snapshot in snapshots {
            debug!(
                "restoring collection '{}' ({} documents)",
                snapshot.name, snapshot.length
            );
            let collection = Collection::from_snapshot(
                snapshot,
                &self.options.namespace,
                self.driver.clone(),
            )?;
            collections.insert(collection.name().to_string(), collection);
        }
        Ok(self)
    }

    /// Destroys every collection and clears the store's mapping.
    pub async fn destroy(&self) -> StoreResult<()> {
        let drained: Vec<Collection> = {
            let mut collections = self.collections.write().await;
            collections.drain().map(|(_, collection)| collection).collect()
        };
        for collection in drained {
            collection.destroy().await?;
        }
        Ok(())
    }
}

/// Builder for [`Store`] instances.
///
/// A driver must be configured; building without one fails with
/// [`StoreError::DriverNotFound`] before any collection can be created.
#[derive(Debug, Default)]
pub struct StoreBuilder {
    options: StoreOptions,
    driver: Option<DriverHandle>,
}

impl StoreBuilder {
    /// Creates a builder with default options and no driver.
    pub fn new() -> Self {
        Self {
            options: StoreOptions::default(),
            driver: None,
        }
    }

    /// Sets the backing-store namespace.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.options.namespace = namespace.into();
        self
    }

    /// Sets the default auto-commit flag for new collections.
    pub fn auto_commit(mut self, auto_commit: bool) -> Self {
        self.options.auto_commit = auto_commit;
        self
    }

    /// Sets the persistence driver.
    pub fn driver(mut self, driver: DriverHandle) -> Self {
        self.driver = Some(driver);
        self
    }

    /// Builds the store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DriverNotFound`] when no driver was
    /// configured.
    pub fn build(self) -> StoreResult<Store> {
        let driver = self.driver.ok_or_else(|| {
            StoreError::DriverNotFound("no persistence driver configured".to_string())
        })?;
        Ok(Store {
            version: env!("CARGO_PKG_VERSION"),
            options: self.options,
            driver,
            collections: RwLock::new(HashMap::new()),
        })
    }
}
