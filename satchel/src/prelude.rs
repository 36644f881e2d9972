//! Convenient re-exports of commonly used types.
//!
//! ```ignore
//! use satchel::prelude::*;
//! ```

pub use satchel_core::{
    collection::{Collection, CollectionOptions},
    document::{Document, ID_FIELD},
    driver::{CollectionSnapshot, DriverHandle, PersistenceDriver},
    error::{StoreError, StoreResult},
    query::{Filter, Operator, Query},
    store::{Store, StoreBuilder, StoreOptions},
    value::ValueKind,
};

pub use crate::{Config, DriverConfig, open};
