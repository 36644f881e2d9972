//! Persistence driver abstraction.
//!
//! A [`PersistenceDriver`] is the capability a store delegates
//! serialization to. Two concrete shapes exist in the companion crates: a
//! synchronous key-value driver (`satchel-kv`), whose operations complete
//! immediately, and an asynchronous transactional driver (`satchel-sql`),
//! which genuinely suspends between issuing a request and receiving its
//! outcome. The driver is owned by the store; collections hold a shared
//! handle and never own it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{fmt::Debug, sync::Arc};

use crate::{collection::CollectionOptions, error::StoreResult};

/// Shared handle to the active persistence driver.
pub type DriverHandle = Arc<dyn PersistenceDriver>;

/// Serialized form of one collection, as handed to a persistence driver
/// and read back on restore.
///
/// The wire format is JSON: `{ name, options, documents, length }`. The
/// live driver reference is never part of the persisted options; it is
/// re-attached from the store configuration when a snapshot is restored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionSnapshot {
    /// The collection name, unique within its store.
    pub name: String,
    /// The collection options in effect when the snapshot was taken.
    pub options: CollectionOptions,
    /// Document bodies in insertion order.
    pub documents: Vec<Map<String, Value>>,
    /// Document count at snapshot time; equals `documents.len()`.
    pub length: usize,
}

/// Abstract interface for persisting collection snapshots.
///
/// Implementations serialize whole snapshots; there is no per-document
/// persistence. A commit replaces whatever the backing store previously
/// held for that collection (snapshot-replace, no history).
///
/// # Concurrency
///
/// Callers must serialize commits per collection. Two overlapping commits
/// of the same collection race with last-writer-wins and no ordering
/// guarantee; interleaving with operations on other collections is safe.
#[async_trait]
pub trait PersistenceDriver: Send + Sync + Debug {
    /// Writes a collection snapshot to the backing store under the given
    /// namespace, replacing any previous snapshot of that collection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Driver`](crate::error::StoreError::Driver) or
    /// [`StoreError::Serialization`](crate::error::StoreError::Serialization)
    /// when the write or the encoding fails.
    async fn persist(&self, namespace: &str, snapshot: &CollectionSnapshot) -> StoreResult<()>;

    /// Reads back every collection snapshot stored under the namespace.
    ///
    /// Entries that fail to deserialize are skipped rather than failing the
    /// whole restore; backend-level failures abort it. See the concrete
    /// drivers for the exact split.
    async fn restore(&self, namespace: &str) -> StoreResult<Vec<CollectionSnapshot>>;
}
