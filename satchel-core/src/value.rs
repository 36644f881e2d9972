//! Value utilities shared by the query engine.
//!
//! This module provides dotted-path resolution over nested documents,
//! the loose cross-type comparisons the operator set is built on, and
//! runtime kind tags for `$type` queries.

use serde_json::Value;
use std::cmp::Ordering;

/// Runtime kind tag of a JSON value.
///
/// Every document value carries exactly one of these kinds. `Null` and
/// `Array` are first-class tags rather than flavors of `Object`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl ValueKind {
    /// Returns the kind tag of a value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }

    /// Parses a kind name as used by `$type` operands.
    ///
    /// Recognized names are `"null"`, `"boolean"`, `"number"`, `"string"`,
    /// `"array"` and `"object"`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "null" => Some(ValueKind::Null),
            "boolean" => Some(ValueKind::Bool),
            "number" => Some(ValueKind::Number),
            "string" => Some(ValueKind::String),
            "array" => Some(ValueKind::Array),
            "object" => Some(ValueKind::Object),
            _ => None,
        }
    }

    /// The canonical name of this kind.
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "boolean",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        }
    }
}

/// Resolves a dotted field path against a nested value.
///
/// Each path segment indexes into the current container: object segments
/// select fields, array segments are parsed as zero-based indices
/// (`"tags.0"`, `"profile.settings.1.active"`). Returns `None` when any
/// segment is missing or the traversal hits a non-container. Absence is a
/// normal outcome consumed by the matcher, never an error.
pub fn resolve_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Loose equality between two values.
///
/// Values of the same kind compare structurally. Across kinds, two
/// coercions apply: a number equals a numeric string with the same numeric
/// value (`18 == "18"`), and a boolean equals the numbers `0`/`1`. All
/// other cross-kind pairs are unequal.
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(_), Value::Number(_)) => numeric(a) == numeric(b),
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| loose_eq(l, r))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(key, left)| y.get(key).is_some_and(|right| loose_eq(left, right)))
        }
        (Value::Number(_), Value::String(_)) | (Value::String(_), Value::Number(_)) => {
            match (numeric(a), numeric(b)) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            }
        }
        (Value::Bool(x), Value::Number(_)) | (Value::Number(_), Value::Bool(x)) => {
            let flag = if *x { 1.0 } else { 0.0 };
            numeric(a).or(numeric(b)) == Some(flag)
        }
        _ => false,
    }
}

/// Ordered comparison for the range operators.
///
/// Numbers compare numerically, strings lexicographically, and a number
/// against a numeric string coerces to a numeric comparison. Every other
/// pairing is not ordinally comparable and yields `None`.
pub fn ordered_cmp(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Number(_), Value::Number(_))
        | (Value::Number(_), Value::String(_))
        | (Value::String(_), Value::Number(_)) => {
            numeric(a)?.partial_cmp(&numeric(b)?)
        }
        _ => None,
    }
}

/// Numeric view of a value: numbers as-is, strings parsed when they hold a
/// number, everything else `None`.
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
