//! Core of the satchel document store: an in-memory collection of JSON
//! documents queryable with a declarative, comparison-operator-based
//! language and persisted through a pluggable storage driver.
//!
//! This crate provides:
//!
//! - **Documents** ([`document`]) - Schema-less JSON records carrying a
//!   reserved `_id` field
//! - **Collections** ([`collection`]) - Named, insertion-ordered document
//!   sets with insert/find/update/remove/commit
//! - **Queries** ([`query`]) - The operator set (`$eq`, `$ne`, `$or`,
//!   `$gt`, `$gte`, `$lt`, `$lte`, `$contains`, `$in`, `$nin`, `$type`)
//!   and the matching engine
//! - **Partial updates** ([`merge`]) - Deep merge for nested objects,
//!   whole replacement for everything else
//! - **Stores** ([`store`]) - The root owner of collections and the
//!   active driver
//! - **Driver abstraction** ([`driver`]) - The capability trait concrete
//!   persistence drivers implement
//! - **Error handling** ([`error`]) - Error and result types
//!
//! Concrete drivers live in the `satchel-kv` and `satchel-sql` crates; the
//! `satchel` facade crate ties everything together and is where most users
//! should start.

pub mod collection;
pub mod document;
pub mod driver;
pub mod error;
pub mod merge;
pub mod query;
pub mod store;
pub mod value;
