//! Schema-less document representation.
//!
//! A [`Document`] wraps a JSON object payload and guarantees the reserved
//! `_id` field is present. Construction consumes the payload and returns a
//! new owned value; callers never receive an alias to their input.

use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    error::{StoreError, StoreResult},
    value::{ValueKind, resolve_path},
};

/// Reserved identifier field present on every document.
pub const ID_FIELD: &str = "_id";

/// A single schema-less record, uniquely identified within its collection
/// by the `_id` field.
///
/// `_id` is a string or a number. When the payload carries one it is
/// preserved exactly; otherwise a random low-collision identifier is
/// assigned at construction time. Identifiers are not checked for
/// uniqueness across a collection, they are merely expected to be unique.
///
/// Documents serialize transparently as their JSON object body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Document {
    body: Value,
}

impl Document {
    /// Builds a document from a JSON object payload.
    ///
    /// Assigns a freshly generated identifier when the payload has no
    /// `_id`. The identifier is random enough for interactive use, not
    /// adversarially collision-safe.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidArgument`] when the payload is not an
    /// object.
    pub fn new(payload: Value) -> StoreResult<Self> {
        let mut body = match payload {
            Value::Object(map) => map,
            other => {
                return Err(StoreError::InvalidArgument(format!(
                    "expected an object payload, got {}",
                    ValueKind::of(&other).name()
                )));
            }
        };

        if !body.contains_key(ID_FIELD) {
            body.insert(
                ID_FIELD.to_string(),
                Value::String(Uuid::new_v4().to_string()),
            );
        }

        Ok(Self { body: Value::Object(body) })
    }

    /// The document identifier, a string or a number.
    pub fn id(&self) -> &Value {
        self.fields()
            .get(ID_FIELD)
            .expect("document body always carries an identifier")
    }

    /// Resolves a dotted field path against this document.
    ///
    /// See [`resolve_path`] for path semantics. Returns `None` for absent
    /// paths.
    pub fn get(&self, path: &str) -> Option<&Value> {
        resolve_path(&self.body, path)
    }

    /// The document body as a JSON value (always an object).
    pub fn as_value(&self) -> &Value {
        &self.body
    }

    /// Consumes the document, returning its body.
    pub fn into_value(self) -> Value {
        self.body
    }

    /// The document fields.
    pub fn fields(&self) -> &Map<String, Value> {
        self.body
            .as_object()
            .expect("document body is always an object")
    }
}

impl From<Document> for Value {
    fn from(document: Document) -> Value {
        document.into_value()
    }
}
