//! Satchel is a lightweight, embeddable, schema-less JSON document store.
//!
//! Documents live in named, insertion-ordered collections owned by a
//! [`Store`]. Collections are queried with a declarative,
//! comparison-operator-based language and persisted through a pluggable
//! storage driver: a synchronous key-value driver (the default) or an
//! asynchronous transactional one.
//!
//! # Quick Start
//!
//! ```ignore
//! use satchel::{Config, open};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = open(Config::default())?;
//!     let people = store.collection("people").await?;
//!
//!     people.insert(json!({ "name": "Person 1", "age": 15 })).await?;
//!     people.insert(json!({ "name": "Person 2", "age": 21 })).await?;
//!
//!     let adults = people
//!         .find(json!({ "age": { "$gte": 18 } }).try_into()?)
//!         .await?;
//!     assert_eq!(adults.len(), 1);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Queries
//!
//! Queries are JSON mappings from field paths to literals (shorthand for
//! `$eq`) or one-key operator mappings. Field paths may be dotted and may
//! index into arrays:
//!
//! ```ignore
//! people.find(json!({ "profile.settings.1.active": false }).try_into()?).await?;
//! people.find(json!({ "$or": [{ "age": { "$gt": 30 } }, { "age": { "$lte": 15 } }] }).try_into()?).await?;
//! people.find_one("394".into()).await?; // bare id shorthand
//! ```
//!
//! The supported operators are `$eq`, `$ne`, `$or`, `$gt`, `$gte`, `$lt`,
//! `$lte`, `$contains`, `$in`, `$nin` and `$type`.
//!
//! # Persistence
//!
//! Every collection serializes as one snapshot. With auto-commit on (the
//! default) each mutation commits; otherwise call
//! [`Collection::commit`](satchel_core::collection::Collection::commit)
//! or [`Store::commit`](satchel_core::store::Store::commit) explicitly,
//! and [`Store::restore`](satchel_core::store::Store::restore) to load
//! persisted collections back at startup.
//!
//! Overlapping commits of the same collection are a race the caller must
//! avoid under the transactional driver; serialize them, for example
//! through a queue. Interleaving work on different collections is safe.

use std::sync::Arc;

use satchel_core::{driver::DriverHandle, error::StoreError};
use satchel_kv::{KeyValueDriver, KeyValueStore, MemoryKeyValueStore};
use satchel_sql::{TransactionClient, TransactionalDriver};

pub mod prelude;

pub use satchel_core::{collection, document, driver, error, merge, query, store, value};
pub use satchel_core::{error::StoreResult, store::Store};

// Re-export the JSON value type the document model is built on.
pub use serde_json;

/// Key-value persistence building blocks.
pub mod kv {
    pub use satchel_kv::{KeyValueDriver, KeyValueStore, MemoryKeyValueStore};
}

/// Transactional persistence building blocks.
pub mod sql {
    pub use satchel_sql::{
        MemoryTransactionClient, Row, Transaction, TransactionClient, TransactionalDriver,
    };
}

/// Persistence driver selection.
///
/// Evaluated exactly once, by [`open`], before any collection is created.
#[derive(Debug, Clone)]
pub enum DriverConfig {
    /// In-process key-value storage, the default.
    Default,
    /// Caller-supplied synchronous key-value storage.
    KeyValue(Arc<dyn KeyValueStore>),
    /// Caller-supplied asynchronous transactional storage. `None` means
    /// the host offers no such capability, which fails the open with
    /// [`StoreError::UnsupportedDriver`].
    Transactional(Option<Arc<dyn TransactionClient>>),
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig::Default
    }
}

/// Store configuration consumed by [`open`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Namespace under which the backing store is keyed.
    pub namespace: String,
    /// Default auto-commit flag for new collections.
    pub auto_commit: bool,
    /// Which persistence driver to use.
    pub driver: DriverConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: "satchel".to_string(),
            auto_commit: true,
            driver: DriverConfig::default(),
        }
    }
}

/// Opens a store with the configured persistence driver.
///
/// Driver resolution happens here, before any collection exists:
/// `Default` and `KeyValue` select the synchronous key-value driver (over
/// an in-process store or the supplied capability respectively), while
/// `Transactional` probes for the host capability and selects the
/// asynchronous driver.
///
/// # Errors
///
/// Returns [`StoreError::UnsupportedDriver`] when `Transactional` is
/// requested without a capability handle.
pub fn open(config: Config) -> StoreResult<Store> {
    let driver: DriverHandle = match config.driver {
        DriverConfig::Default => {
            Arc::new(KeyValueDriver::new(Arc::new(MemoryKeyValueStore::new())))
        }
        DriverConfig::KeyValue(store) => Arc::new(KeyValueDriver::new(store)),
        DriverConfig::Transactional(Some(client)) => Arc::new(TransactionalDriver::new(client)),
        DriverConfig::Transactional(None) => {
            return Err(StoreError::UnsupportedDriver(
                "no transactional capability available from the host".to_string(),
            ));
        }
    };

    Store::builder()
        .namespace(config.namespace)
        .auto_commit(config.auto_commit)
        .driver(driver)
        .build()
}
