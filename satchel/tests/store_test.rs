use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use satchel::DriverConfig;
use satchel::kv::{KeyValueStore, MemoryKeyValueStore};
use satchel::prelude::*;
use serde_json::{Value, json};

fn q(value: Value) -> Query {
    Query::try_from(value).unwrap()
}

/// Key-value capability that counts writes, for asserting commit
/// granularity.
#[derive(Debug, Default)]
struct CountingStore {
    inner: MemoryKeyValueStore,
    writes: AtomicUsize,
}

impl KeyValueStore for CountingStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: String) {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value);
    }

    fn remove(&self, key: &str) {
        self.inner.remove(key);
    }

    fn keys(&self) -> Vec<String> {
        self.inner.keys()
    }
}

fn open_over(backing: Arc<dyn KeyValueStore>) -> Store {
    open(Config {
        namespace: "pocket".to_string(),
        driver: DriverConfig::KeyValue(backing),
        ..Config::default()
    })
    .unwrap()
}

#[tokio::test]
async fn creates_a_store_with_a_version() {
    let store = open(Config::default()).unwrap();
    assert!(!store.version().is_empty());
}

#[tokio::test]
async fn creates_and_removes_collections() {
    let store = open(Config::default()).unwrap();
    store.collection("test").await.unwrap();
    assert!(store.has_collection("test").await);

    store.remove_collection("test").await.unwrap();
    assert!(!store.has_collection("test").await);
}

#[tokio::test]
async fn removing_an_unknown_collection_is_a_no_op() {
    let store = open(Config::default()).unwrap();
    store.remove_collection("missing").await.unwrap();
}

#[tokio::test]
async fn collection_requires_a_name() {
    let store = open(Config::default()).unwrap();
    assert!(matches!(
        store.collection("").await,
        Err(StoreError::InvalidArgument(_))
    ));
    assert!(matches!(
        store.commit("").await,
        Err(StoreError::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn collection_returns_the_same_collection_by_name() {
    let store = open(Config::default()).unwrap();
    let first = store.collection("test").await.unwrap();
    first.insert(json!({})).await.unwrap();

    let second = store.collection("test").await.unwrap();
    assert_eq!(second.size().await, 1);
}

#[tokio::test]
async fn building_without_a_driver_fails() {
    assert!(matches!(
        Store::builder().build(),
        Err(StoreError::DriverNotFound(_))
    ));
}

#[tokio::test]
async fn commits_an_empty_collection() {
    let backing = Arc::new(MemoryKeyValueStore::new());
    let store = open_over(backing.clone());
    let collection = store.collection("test").await.unwrap();

    collection.remove(Query::all()).await.unwrap();
    collection.commit().await.unwrap();
    assert!(backing.get("pocket.test").is_some());
}

#[tokio::test]
async fn commits_a_non_empty_collection() {
    let backing = Arc::new(MemoryKeyValueStore::new());
    let store = open_over(backing.clone());
    let collection = store.collection("test").await.unwrap();

    backing.remove("pocket.test");
    assert!(backing.get("pocket.test").is_none());

    collection
        .insert(json!({ "forename": "Foo", "surname": "Bar" }))
        .await
        .unwrap();
    collection.commit().await.unwrap();

    let raw = backing.get("pocket.test").unwrap();
    let data: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(data["name"], json!("test"));
    assert_eq!(data["length"], json!(1));
    assert_eq!(data["documents"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn store_commit_by_name_delegates() {
    let backing = Arc::new(MemoryKeyValueStore::new());
    let store = open(Config {
        namespace: "pocket".to_string(),
        auto_commit: false,
        driver: DriverConfig::KeyValue(backing.clone()),
    })
    .unwrap();

    let collection = store.collection("test").await.unwrap();
    collection.insert(json!({ "forename": "Foo" })).await.unwrap();
    assert!(backing.get("pocket.test").is_none());

    store.commit("test").await.unwrap();
    assert!(backing.get("pocket.test").is_some());

    // Unknown names are a no-op
    store.commit("missing").await.unwrap();
    assert!(backing.get("pocket.missing").is_none());
}

#[tokio::test]
async fn auto_commit_can_be_disabled_per_collection() {
    let backing = Arc::new(MemoryKeyValueStore::new());
    let store = open_over(backing.clone());
    let collection = store
        .collection_with("quiet", Some(CollectionOptions { auto_commit: false }))
        .await
        .unwrap();

    collection.insert(json!({})).await.unwrap();
    assert!(backing.get("pocket.quiet").is_none());

    collection.commit().await.unwrap();
    assert!(backing.get("pocket.quiet").is_some());
}

#[tokio::test]
async fn batch_inserts_commit_once() {
    let backing = Arc::new(CountingStore::default());
    let store = open(Config {
        namespace: "pocket".to_string(),
        driver: DriverConfig::KeyValue(backing.clone()),
        ..Config::default()
    })
    .unwrap();

    let collection = store.collection("test").await.unwrap();
    collection
        .insert_many(vec![json!({}), json!({}), json!({}), json!({})])
        .await
        .unwrap();
    assert_eq!(backing.writes.load(Ordering::SeqCst), 1);

    collection.insert(json!({})).await.unwrap();
    assert_eq!(backing.writes.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn commit_restore_round_trip() {
    let backing = Arc::new(MemoryKeyValueStore::new());
    {
        let store = open_over(backing.clone());
        let collection = store.collection("test").await.unwrap();
        collection
            .insert_many(vec![
                json!({ "_id": "1", "forename": "Foo" }),
                json!({ "_id": "2", "forename": "Bar", "tags": ["x"] }),
            ])
            .await
            .unwrap();
        collection.commit().await.unwrap();
    }

    let fresh = open_over(backing);
    assert!(!fresh.has_collection("test").await);
    fresh.restore().await.unwrap();

    let restored = fresh.collection("test").await.unwrap();
    assert_eq!(restored.size().await, 2);
    let documents = restored.find(Query::all()).await.unwrap();
    assert_eq!(documents[0].id(), &json!("1"));
    assert_eq!(documents[1].get("tags"), Some(&json!(["x"])));
}

#[tokio::test]
async fn restored_collections_reattach_the_live_driver() {
    let backing = Arc::new(MemoryKeyValueStore::new());
    {
        let store = open_over(backing.clone());
        let collection = store.collection("test").await.unwrap();
        collection.insert(json!({ "_id": "1" })).await.unwrap();
    }

    let fresh = open_over(backing.clone());
    fresh.restore().await.unwrap();
    let restored = fresh.collection("test").await.unwrap();
    restored.insert(json!({ "_id": "2" })).await.unwrap();

    let raw = backing.get("pocket.test").unwrap();
    let data: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(data["length"], json!(2));
    // The driver handle itself is never part of the persisted options
    assert_eq!(data["options"], json!({ "autoCommit": true }));
}

#[tokio::test]
async fn restore_skips_undecodable_entries() {
    let backing = Arc::new(MemoryKeyValueStore::new());
    {
        let store = open_over(backing.clone());
        let collection = store.collection("good").await.unwrap();
        collection.insert(json!({ "_id": "1" })).await.unwrap();
    }
    backing.set("pocket.bad", "{ not json".to_string());

    let fresh = open_over(backing);
    fresh.restore().await.unwrap();
    assert!(fresh.has_collection("good").await);
    assert!(!fresh.has_collection("bad").await);
}

#[tokio::test]
async fn removed_collections_flush_empty_state() {
    let backing = Arc::new(MemoryKeyValueStore::new());
    let store = open_over(backing.clone());
    let collection = store.collection("test").await.unwrap();
    collection.insert(json!({ "_id": "1" })).await.unwrap();

    store.remove_collection("test").await.unwrap();

    let raw = backing.get("pocket.test").unwrap();
    let data: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(data["length"], json!(0));
    assert_eq!(data["documents"], json!([]));
}

#[tokio::test]
async fn destroying_a_collection_commits_even_with_auto_commit_off() {
    let backing = Arc::new(MemoryKeyValueStore::new());
    let store = open(Config {
        namespace: "pocket".to_string(),
        auto_commit: false,
        driver: DriverConfig::KeyValue(backing.clone()),
    })
    .unwrap();

    let collection = store.collection("test").await.unwrap();
    collection.insert(json!({ "_id": "1" })).await.unwrap();
    assert!(backing.get("pocket.test").is_none());

    collection.destroy().await.unwrap();
    assert!(backing.get("pocket.test").is_some());
    assert_eq!(collection.size().await, 0);
}

#[tokio::test]
async fn store_destroy_forgets_every_collection() {
    let store = open(Config::default()).unwrap();
    store.collection("a").await.unwrap();
    store.collection("b").await.unwrap();
    assert_eq!(store.collection_names().await.len(), 2);

    store.destroy().await.unwrap();
    assert!(store.collection_names().await.is_empty());
}
