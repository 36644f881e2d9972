//! Asynchronous transactional persistence driver for satchel.
//!
//! This crate persists collection snapshots through a SQL-like
//! transactional capability the host injects. Each commit drops and
//! recreates a one-row table named after the collection and inserts the
//! JSON-encoded snapshot; restore enumerates the tables and reads the
//! latest snapshot row from each. History is not retained: a commit
//! replaces whatever the previous commit wrote.
//!
//! The capability is the [`TransactionClient`]/[`Transaction`] trait pair.
//! A client handle is already scoped to one database by the host, so table
//! names carry no namespace prefix. [`MemoryTransactionClient`] emulates
//! the driver's statement dialect in process, for tests and for hosts
//! without a SQL engine.
//!
//! # Concurrency
//!
//! Driver operations genuinely suspend between issuing a transaction and
//! receiving its outcome. No other store state is touched during that
//! suspension, so interleaving with work on other collections is safe.
//! Overlapping commits of the *same* collection race with
//! last-writer-wins; callers are responsible for serializing them, for
//! example through a queue.

pub mod client;
pub mod driver;
pub mod memory;

pub use client::{Row, Transaction, TransactionClient};
pub use driver::TransactionalDriver;
pub use memory::MemoryTransactionClient;
