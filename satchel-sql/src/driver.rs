//! The transactional persistence driver.

use async_trait::async_trait;
use log::warn;
use serde_json::Value;
use std::sync::Arc;

use satchel_core::{
    driver::{CollectionSnapshot, PersistenceDriver},
    error::StoreResult,
};

use crate::client::TransactionClient;

/// Catalog query for enumerating the tables the engine holds.
const LIST_TABLES: &str = "SELECT name FROM sqlite_master WHERE type = 'table'";

/// Persistence driver over an asynchronous [`TransactionClient`]
/// capability.
///
/// One table per collection, holding a single snapshot row. A commit
/// drops and recreates the table inside one transaction, so the previous
/// snapshot is replaced and no history accumulates.
#[derive(Debug, Clone)]
pub struct TransactionalDriver {
    client: Arc<dyn TransactionClient>,
}

impl TransactionalDriver {
    /// Creates a driver over the given transactional capability.
    pub fn new(client: Arc<dyn TransactionClient>) -> Self {
        Self { client }
    }
}

/// Collection names become table identifiers; anything outside
/// `[A-Za-z0-9_]` is mapped to `_` before reaching the engine. The real
/// name travels inside the snapshot payload, so sanitizing the identifier
/// does not affect what a restore reconstructs.
fn table_ident(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Engine-internal tables that must not be treated as collection
/// snapshots on restore.
fn is_internal_table(name: &str) -> bool {
    name.starts_with("sqlite_") || name.starts_with("__")
}

#[async_trait]
impl PersistenceDriver for TransactionalDriver {
    async fn persist(&self, _namespace: &str, snapshot: &CollectionSnapshot) -> StoreResult<()> {
        let encoded = serde_json::to_string(snapshot)?;
        let table = table_ident(&snapshot.name);

        let mut tx = self.client.begin().await?;
        tx.execute(&format!("DROP TABLE IF EXISTS \"{table}\""), &[])
            .await?;
        tx.execute(
            &format!("CREATE TABLE IF NOT EXISTS \"{table}\" (snapshot TEXT NOT NULL)"),
            &[],
        )
        .await?;
        tx.execute(
            &format!("INSERT INTO \"{table}\" (snapshot) VALUES (?1)"),
            &[Value::String(encoded)],
        )
        .await?;
        tx.commit().await
    }

    /// Enumerates the database's tables and reads the latest snapshot row
    /// from each. A failing statement aborts the restore; a row whose
    /// payload does not decode is skipped like an undecodable key-value
    /// entry.
    async fn restore(&self, _namespace: &str) -> StoreResult<Vec<CollectionSnapshot>> {
        let mut tx = self.client.begin().await?;
        let tables = tx.execute(LIST_TABLES, &[]).await?;

        let mut snapshots = Vec::new();
        for row in tables {
            let Some(table) = row.get("name").and_then(Value::as_str) else {
                continue;
            };
            if is_internal_table(table) {
                continue;
            }

            let rows = tx
                .execute(
                    &format!("SELECT snapshot FROM \"{table}\" ORDER BY rowid DESC LIMIT 1"),
                    &[],
                )
                .await?;
            let Some(raw) = rows
                .first()
                .and_then(|row| row.get("snapshot"))
                .and_then(Value::as_str)
            else {
                continue;
            };

            match serde_json::from_str::<CollectionSnapshot>(raw) {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(err) => warn!("skipping undecodable snapshot in table '{table}': {err}"),
            }
        }

        tx.commit().await?;
        Ok(snapshots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryTransactionClient;
    use satchel_core::collection::CollectionOptions;
    use serde_json::json;

    fn snapshot(name: &str, documents: Vec<Value>) -> CollectionSnapshot {
        let length = documents.len();
        CollectionSnapshot {
            name: name.to_string(),
            options: CollectionOptions::default(),
            documents: documents
                .into_iter()
                .map(|doc| doc.as_object().cloned().unwrap())
                .collect(),
            length,
        }
    }

    #[tokio::test]
    async fn commit_then_restore_round_trips() {
        let client = Arc::new(MemoryTransactionClient::new());
        let driver = TransactionalDriver::new(client);

        driver
            .persist(
                "pocket",
                &snapshot("test", vec![json!({ "_id": "1", "forename": "Foo" })]),
            )
            .await
            .unwrap();

        let restored = driver.restore("pocket").await.unwrap();
        assert_eq!(restored.len(), 1);
        assert_eq!(restored[0].name, "test");
        assert_eq!(restored[0].length, 1);
        assert_eq!(restored[0].documents[0]["forename"], json!("Foo"));
    }

    #[tokio::test]
    async fn a_second_commit_replaces_the_first() {
        let client = Arc::new(MemoryTransactionClient::new());
        let driver = TransactionalDriver::new(client);

        driver
            .persist("pocket", &snapshot("test", vec![json!({ "_id": "1" })]))
            .await
            .unwrap();
        driver
            .persist(
                "pocket",
                &snapshot("test", vec![json!({ "_id": "2" }), json!({ "_id": "3" })]),
            )
            .await
            .unwrap();

        let restored = driver.restore("pocket").await.unwrap();
        assert_eq!(restored.len(), 1);
        assert_eq!(restored[0].length, 2);
        assert_eq!(restored[0].documents[0]["_id"], json!("2"));
    }

    #[tokio::test]
    async fn table_identifiers_are_sanitized() {
        assert_eq!(table_ident("user accounts"), "user_accounts");
        assert_eq!(table_ident("a\"b;drop"), "a_b_drop");
        assert_eq!(table_ident("plain_1"), "plain_1");
    }
}
