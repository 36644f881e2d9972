//! Synchronous key-value persistence driver for satchel.
//!
//! This crate provides the default persistence path: collection snapshots
//! are JSON-encoded and written through a [`KeyValueStore`] capability,
//! one entry per collection under the key `<namespace>.<collection>`.
//! The capability models the host environment's raw key-value primitive;
//! [`MemoryKeyValueStore`] is the bundled in-process implementation.
//!
//! All operations complete immediately. The async driver surface exists so
//! key-value and transactional drivers are interchangeable behind the same
//! trait; awaiting a key-value commit never suspends in practice.

pub mod capability;
pub mod driver;
pub mod memory;

pub use capability::KeyValueStore;
pub use driver::KeyValueDriver;
pub use memory::MemoryKeyValueStore;
