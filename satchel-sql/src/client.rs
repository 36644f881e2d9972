//! The asynchronous transactional storage capability.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt::Debug;

use satchel_core::error::StoreResult;

/// One result row, keyed by column name.
pub type Row = Map<String, Value>;

/// A single open transaction.
///
/// Statements executed on one transaction are applied atomically when the
/// transaction commits. Dropping a transaction without committing discards
/// its writes where the host engine supports rollback.
#[async_trait]
pub trait Transaction: Send {
    /// Executes one statement with positional parameters and returns the
    /// result rows.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Driver`](satchel_core::error::StoreError::Driver)
    /// when the engine rejects the statement.
    async fn execute(&mut self, statement: &str, params: &[Value]) -> StoreResult<Vec<Row>>;

    /// Commits the transaction.
    async fn commit(self: Box<Self>) -> StoreResult<()>;
}

/// A host-provided handle to a SQL-like transactional engine, scoped to
/// one database.
#[async_trait]
pub trait TransactionClient: Send + Sync + Debug {
    /// Opens a new transaction.
    async fn begin<'a>(&'a self) -> StoreResult<Box<dyn Transaction + 'a>>;
}
