//! The synchronous key-value storage capability.

use std::fmt::Debug;

/// A host-provided key-value store the driver writes through.
///
/// Keys are opaque strings, values are serialized JSON text. Implementors
/// must be safe to share across tasks; operations are synchronous and are
/// expected to complete without blocking for long.
pub trait KeyValueStore: Send + Sync + Debug {
    /// Returns the stored value for the key, if present.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores a value under the key, replacing any previous value.
    fn set(&self, key: &str, value: String);

    /// Removes the key and its value, if present.
    fn remove(&self, key: &str);

    /// Enumerates every key currently present, in no particular order.
    fn keys(&self) -> Vec<String>;
}
