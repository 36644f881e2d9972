//! Named, insertion-ordered sets of documents with CRUD and persistence
//! operations.
//!
//! A [`Collection`] is a cheap-to-clone handle; clones share the same
//! underlying document sequence. Collections are created through their
//! owning store and hold a shared reference to its persistence driver.

use log::debug;
use mea::rwlock::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::{
    document::Document,
    driver::{CollectionSnapshot, DriverHandle},
    error::{StoreError, StoreResult},
    merge::merge,
    query::Query,
};

/// Options applied to one collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionOptions {
    /// When set, every mutating operation commits the collection to the
    /// persistence driver after it completes.
    pub auto_commit: bool,
}

impl Default for CollectionOptions {
    fn default() -> Self {
        Self { auto_commit: true }
    }
}

#[derive(Debug)]
struct CollectionState {
    documents: Vec<Document>,
    /// Tracked alongside the sequence; always equals `documents.len()`.
    length: usize,
}

/// A named, insertion-ordered set of documents.
///
/// Mutating operations keep documents in insertion order: updates replace
/// a document at its existing position, removals close the gap. Query
/// results are snapshots; mutating a result does not touch the collection.
///
/// # Concurrency
///
/// Operations run to completion over an async-aware lock and are not
/// re-entrant against themselves. Commits of the same collection must be
/// serialized by the caller; see
/// [`PersistenceDriver`](crate::driver::PersistenceDriver).
#[derive(Debug, Clone)]
pub struct Collection {
    name: Arc<str>,
    namespace: Arc<str>,
    options: CollectionOptions,
    driver: DriverHandle,
    state: Arc<RwLock<CollectionState>>,
}

impl Collection {
    pub(crate) fn new(
        name: &str,
        namespace: &str,
        options: CollectionOptions,
        driver: DriverHandle,
    ) -> Self {
        Self {
            name: Arc::from(name),
            namespace: Arc::from(namespace),
            options,
            driver,
            state: Arc::new(RwLock::new(CollectionState { documents: Vec::new(), length: 0 })),
        }
    }

    /// Rebuilds a collection from a persisted snapshot, re-attaching the
    /// live driver. Documents pass through validation again, and the
    /// length is recomputed from the restored sequence.
    pub(crate) fn from_snapshot(
        snapshot: CollectionSnapshot,
        namespace: &str,
        driver: DriverHandle,
    ) -> StoreResult<Self> {
        let documents = snapshot
            .documents
            .into_iter()
            .map(|body| Document::new(Value::Object(body)))
            .collect::<StoreResult<Vec<_>>>()?;
        let length = documents.len();

        Ok(Self {
            name: Arc::from(snapshot.name.as_str()),
            namespace: Arc::from(namespace),
            options: snapshot.options,
            driver,
            state: Arc::new(RwLock::new(CollectionState { documents, length })),
        })
    }

    /// The collection name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The options this collection was created with.
    pub fn options(&self) -> &CollectionOptions {
        &self.options
    }

    /// Inserts one document built from an object payload.
    ///
    /// An `_id` is assigned when the payload lacks one. Commits when
    /// auto-commit is enabled. Returns an owned copy of the stored
    /// document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidArgument`] when the payload is not an
    /// object; sequence payloads belong to [`Collection::insert_many`].
    pub async fn insert(&self, payload: Value) -> StoreResult<Document> {
        if payload.is_array() {
            return Err(StoreError::InvalidArgument(
                "insert takes one object payload; use insert_many for a sequence".to_string(),
            ));
        }
        let document = Document::new(payload)?;

        {
            let mut state = self.state.write().await;
            state.documents.push(document.clone());
            state.length += 1;
        }

        self.auto_commit().await?;
        Ok(document)
    }

    /// Inserts a batch of object payloads, each validated and appended
    /// independently in order.
    ///
    /// A single commit is issued after the whole batch is in, not one per
    /// element. The batch is validated up front; one bad payload rejects
    /// the whole call and nothing is inserted.
    pub async fn insert_many(&self, payloads: Vec<Value>) -> StoreResult<Vec<Document>> {
        let documents = payloads
            .into_iter()
            .map(Document::new)
            .collect::<StoreResult<Vec<_>>>()?;

        {
            let mut state = self.state.write().await;
            state.documents.extend(documents.iter().cloned());
            state.length += documents.len();
        }

        self.auto_commit().await?;
        Ok(documents)
    }

    /// Returns every document matching the query, in insertion order.
    ///
    /// The result is a fresh snapshot. Criteria apply as a conjunction:
    /// candidates are narrowed once per criterion, each pass testing a
    /// single-criterion sub-query.
    ///
    /// # Errors
    ///
    /// Propagates operator evaluation errors such as
    /// [`StoreError::UnrecognizedOperator`].
    pub async fn find(&self, query: Query) -> StoreResult<Vec<Document>> {
        let mut results = {
            let state = self.state.read().await;
            state.documents.clone()
        };

        for (key, condition) in query.criteria() {
            if results.is_empty() {
                break;
            }
            let mut narrowed = Vec::with_capacity(results.len());
            for document in results {
                if crate::query::matches_criterion(document.as_value(), key, condition)? {
                    narrowed.push(document);
                }
            }
            results = narrowed;
        }

        Ok(results)
    }

    /// Returns the first document matching the query, or `None`.
    pub async fn find_one(&self, query: Query) -> StoreResult<Option<Document>> {
        let mut results = self.find(query).await?;
        if results.is_empty() {
            Ok(None)
        } else {
            Ok(Some(results.remove(0)))
        }
    }

    /// Applies a partial update to every document matching the query.
    ///
    /// Each match is replaced at its existing position by the deep merge of
    /// the patch into it (see [`merge`]): nested objects merge recursively,
    /// scalars and sequences replace wholesale. The merged result passes
    /// through document validation again. Commits when auto-commit is
    /// enabled.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidArgument`] when the patch is not an
    /// object; propagates query evaluation errors.
    pub async fn update(&self, query: Query, patch: Value) -> StoreResult<&Self> {
        if !patch.is_object() {
            return Err(StoreError::InvalidArgument(
                "update patch must be an object".to_string(),
            ));
        }

        let matched = self.find(query).await?;
        {
            let mut state = self.state.write().await;
            for target in &matched {
                if let Some(index) = state.documents.iter().position(|d| d == target) {
                    let base = state.documents[index].clone().into_value();
                    state.documents[index] = Document::new(merge(base, patch.clone()))?;
                }
            }
        }

        self.auto_commit().await?;
        Ok(self)
    }

    /// Removes every document matching the query, [`Query::all`] clears the
    /// collection. Commits when auto-commit is enabled.
    pub async fn remove(&self, query: Query) -> StoreResult<&Self> {
        let matched = self.find(query).await?;
        {
            let mut state = self.state.write().await;
            for target in &matched {
                if let Some(index) = state.documents.iter().position(|d| d == target) {
                    state.documents.remove(index);
                    state.length -= 1;
                }
            }
        }

        self.auto_commit().await?;
        Ok(self)
    }

    /// The current number of documents.
    pub async fn size(&self) -> usize {
        self.state.read().await.documents.len()
    }

    /// Serializes the collection and hands the snapshot to the configured
    /// persistence driver.
    pub async fn commit(&self) -> StoreResult<&Self> {
        let snapshot = self.snapshot().await;
        debug!(
            "committing collection '{}' ({} documents)",
            self.name, snapshot.length
        );
        self.driver.persist(&self.namespace, &snapshot).await?;
        Ok(self)
    }

    /// Empties the collection and flushes the empty state to the driver.
    ///
    /// The flush happens even when auto-commit is off, so a destroyed
    /// collection restores as empty rather than with stale documents.
    pub async fn destroy(&self) -> StoreResult<()> {
        {
            let mut state = self.state.write().await;
            state.documents.clear();
            state.length = 0;
        }
        self.commit().await?;
        Ok(())
    }

    async fn snapshot(&self) -> CollectionSnapshot {
        let state = self.state.read().await;
        CollectionSnapshot {
            name: self.name.to_string(),
            options: self.options.clone(),
            documents: state
                .documents
                .iter()
                .map(|document| document.fields().clone())
                .collect(),
            length: state.length,
        }
    }

    async fn auto_commit(&self) -> StoreResult<()> {
        if self.options.auto_commit {
            self.commit().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    /// Driver that accepts every snapshot and restores nothing.
    #[derive(Debug)]
    struct NullDriver;

    #[async_trait]
    impl crate::driver::PersistenceDriver for NullDriver {
        async fn persist(&self, _: &str, _: &CollectionSnapshot) -> StoreResult<()> {
            Ok(())
        }

        async fn restore(&self, _: &str) -> StoreResult<Vec<CollectionSnapshot>> {
            Ok(Vec::new())
        }
    }

    fn collection() -> Collection {
        Collection::new(
            "test",
            "satchel",
            CollectionOptions::default(),
            Arc::new(NullDriver),
        )
    }

    #[tokio::test]
    async fn insert_rejects_sequence_payloads() {
        let collection = collection();
        let result = collection.insert(json!([{ "a": 1 }])).await;
        assert!(matches!(result, Err(StoreError::InvalidArgument(_))));
        assert_eq!(collection.size().await, 0);
    }

    #[tokio::test]
    async fn a_bad_batch_element_rejects_the_whole_batch() {
        let collection = collection();
        let result = collection
            .insert_many(vec![json!({ "a": 1 }), json!(42)])
            .await;
        assert!(matches!(result, Err(StoreError::InvalidArgument(_))));
        assert_eq!(collection.size().await, 0);
    }

    #[tokio::test]
    async fn updates_replace_documents_in_place() {
        let collection = collection();
        collection.insert(json!({ "_id": "a", "rank": 1 })).await.unwrap();
        collection.insert(json!({ "_id": "b", "rank": 2 })).await.unwrap();
        collection.insert(json!({ "_id": "c", "rank": 3 })).await.unwrap();

        collection
            .update(Query::from("b"), json!({ "rank": 20 }))
            .await
            .unwrap();

        let all = collection.find(Query::all()).await.unwrap();
        let ids: Vec<_> = all.iter().map(|d| d.id().clone()).collect();
        assert_eq!(ids, vec![json!("a"), json!("b"), json!("c")]);
        assert_eq!(all[1].get("rank"), Some(&json!(20)));
    }

    #[tokio::test]
    async fn update_patch_must_be_an_object() {
        let collection = collection();
        collection.insert(json!({ "_id": 1 })).await.unwrap();
        let result = collection.update(Query::from(1i64), json!(["nope"])).await;
        assert!(matches!(result, Err(StoreError::InvalidArgument(_))));
    }
}
