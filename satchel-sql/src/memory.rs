//! In-process transactional storage.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

use satchel_core::error::{StoreError, StoreResult};

use crate::client::{Row, Transaction, TransactionClient};

/// Rows per table, in insertion order. The latest row is the last one.
type TableMap = BTreeMap<String, Vec<String>>;

/// Transaction client backed by an in-process table map.
///
/// Understands exactly the statement dialect the transactional driver
/// emits (drop/create table, insert snapshot row, catalog listing, latest
/// row selection) and rejects anything else. A transaction works on a
/// private copy of the tables and publishes it on commit, so a dropped
/// transaction leaves the shared state untouched.
#[derive(Debug, Default, Clone)]
pub struct MemoryTransactionClient {
    tables: Arc<RwLock<TableMap>>,
}

impl MemoryTransactionClient {
    /// Creates a client with no tables.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionClient for MemoryTransactionClient {
    async fn begin<'a>(&'a self) -> StoreResult<Box<dyn Transaction + 'a>> {
        let working = self.tables.read().clone();
        Ok(Box::new(MemoryTransaction {
            shared: self.tables.clone(),
            working,
        }))
    }
}

struct MemoryTransaction {
    shared: Arc<RwLock<TableMap>>,
    working: TableMap,
}

/// Extracts the identifier between the first pair of double quotes.
fn quoted_ident(statement: &str) -> StoreResult<&str> {
    let start = statement.find('"');
    let end = statement.rfind('"');
    match (start, end) {
        (Some(start), Some(end)) if end > start => Ok(&statement[start + 1..end]),
        _ => Err(StoreError::Driver(format!(
            "statement has no quoted identifier: {statement}"
        ))),
    }
}

#[async_trait]
impl Transaction for MemoryTransaction {
    async fn execute(&mut self, statement: &str, params: &[Value]) -> StoreResult<Vec<Row>> {
        let statement = statement.trim();

        if statement.starts_with("DROP TABLE IF EXISTS") {
            let table = quoted_ident(statement)?;
            self.working.remove(table);
            return Ok(Vec::new());
        }

        if statement.starts_with("CREATE TABLE IF NOT EXISTS") {
            let table = quoted_ident(statement)?;
            self.working.entry(table.to_string()).or_default();
            return Ok(Vec::new());
        }

        if statement.starts_with("INSERT INTO") {
            let table = quoted_ident(statement)?;
            let payload = params
                .first()
                .and_then(Value::as_str)
                .ok_or_else(|| StoreError::Driver("INSERT expects a text parameter".to_string()))?;
            self.working
                .get_mut(table)
                .ok_or_else(|| StoreError::Driver(format!("no such table: {table}")))?
                .push(payload.to_string());
            return Ok(Vec::new());
        }

        if statement.starts_with("SELECT name FROM sqlite_master") {
            return Ok(self
                .working
                .keys()
                .map(|name| {
                    let mut row = Map::new();
                    row.insert("name".to_string(), Value::String(name.clone()));
                    row
                })
                .collect());
        }

        if statement.starts_with("SELECT snapshot FROM") {
            let table = quoted_ident(statement)?;
            let rows = self
                .working
                .get(table)
                .ok_or_else(|| StoreError::Driver(format!("no such table: {table}")))?;
            return Ok(rows
                .last()
                .map(|payload| {
                    let mut row = Map::new();
                    row.insert("snapshot".to_string(), Value::String(payload.clone()));
                    vec![row]
                })
                .unwrap_or_default());
        }

        Err(StoreError::Driver(format!(
            "unsupported statement: {statement}"
        )))
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        *self.shared.write() = self.working;
        Ok(())
    }
}
