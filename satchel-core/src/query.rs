//! Declarative query model and the matching engine.
//!
//! A query is a JSON mapping from field paths (or the `$or` keyword) to
//! either a literal value, which is shorthand for `$eq`, or a one-key
//! operator mapping:
//!
//! ```ignore
//! use satchel::query::Query;
//! use serde_json::json;
//!
//! let by_name = Query::try_from(json!({ "forename": "Foo" }))?;
//! let adults = Query::try_from(json!({ "age": { "$gte": 18 } }))?;
//! let either = Query::try_from(json!({
//!     "$or": [{ "age": { "$gt": 30 } }, { "age": { "$lte": 15 } }]
//! }))?;
//! ```
//!
//! A bare string or number converts to the `{ "_id": value }` shorthand.
//! The [`Filter`] helper builds the same criteria from code.
//!
//! # Matching
//!
//! [`Query::matches`] evaluates a query against one document and decides on
//! the *first* criterion alone. Conjunction across criteria lives one layer
//! up: `Collection::find` narrows its candidate list once per criterion,
//! which is what gives multiple top-level keys AND semantics. Both layers
//! are part of the contract; flattening them would change observable
//! behavior.

use serde_json::{Map, Value, json};
use std::cmp::Ordering;

use crate::{
    document::{Document, ID_FIELD},
    error::{StoreError, StoreResult},
    value::{ValueKind, loose_eq, ordered_cmp, resolve_path},
};

/// Comparison operators understood by the matching engine.
///
/// The set is closed: query keywords resolve through a fixed dispatch
/// table and unknown keywords in operator position are rejected with
/// [`StoreError::UnrecognizedOperator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Or,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    In,
    Nin,
    Type,
}

/// Fixed keyword dispatch table.
const OPERATORS: [(&str, Operator); 11] = [
    ("$eq", Operator::Eq),
    ("$ne", Operator::Ne),
    ("$or", Operator::Or),
    ("$gt", Operator::Gt),
    ("$gte", Operator::Gte),
    ("$lt", Operator::Lt),
    ("$lte", Operator::Lte),
    ("$contains", Operator::Contains),
    ("$in", Operator::In),
    ("$nin", Operator::Nin),
    ("$type", Operator::Type),
];

impl Operator {
    /// Looks a keyword up in the dispatch table.
    pub fn lookup(keyword: &str) -> Option<Operator> {
        OPERATORS
            .iter()
            .find(|(name, _)| *name == keyword)
            .map(|(_, operator)| *operator)
    }

    /// The keyword this operator answers to.
    pub fn keyword(&self) -> &'static str {
        OPERATORS
            .iter()
            .find(|(_, operator)| operator == self)
            .map(|(name, _)| *name)
            .expect("every operator has a table entry")
    }

    /// Applies the operator as a predicate.
    ///
    /// `left` is the resolved field value, or the whole document when the
    /// operator appears as a top-level query key (the `$or` case).
    ///
    /// # Errors
    ///
    /// `$or`, `$in` and `$nin` fail with
    /// [`StoreError::OperatorOperandType`] when the operand is not a
    /// sequence.
    fn apply(&self, left: &Value, operand: &Value) -> StoreResult<bool> {
        match self {
            Operator::Eq => Ok(loose_eq(left, operand)),
            Operator::Ne => Ok(!loose_eq(left, operand)),
            Operator::Gt => Ok(matches!(ordered_cmp(left, operand), Some(Ordering::Greater))),
            Operator::Gte => Ok(matches!(
                ordered_cmp(left, operand),
                Some(Ordering::Greater | Ordering::Equal)
            )),
            Operator::Lt => Ok(matches!(ordered_cmp(left, operand), Some(Ordering::Less))),
            Operator::Lte => Ok(matches!(
                ordered_cmp(left, operand),
                Some(Ordering::Less | Ordering::Equal)
            )),
            Operator::Contains => Ok(contains(left, operand)),
            Operator::In => {
                let items = sequence_operand(*self, operand)?;
                Ok(items.iter().any(|item| loose_eq(left, item)))
            }
            Operator::Nin => {
                let items = sequence_operand(*self, operand)?;
                Ok(!items.iter().any(|item| loose_eq(left, item)))
            }
            Operator::Type => Ok(operand
                .as_str()
                .and_then(ValueKind::parse)
                .is_some_and(|kind| kind == ValueKind::of(left))),
            Operator::Or => {
                let alternatives = sequence_operand(*self, operand)?;
                if left.is_object() {
                    // Structured left side: each alternative is a full
                    // sub-query evaluated against it.
                    for alternative in alternatives {
                        let hit = match alternative.as_object() {
                            Some(criteria) => matches_map(left, criteria)?,
                            None => loose_eq(left, alternative),
                        };
                        if hit {
                            return Ok(true);
                        }
                    }
                    Ok(false)
                } else {
                    Ok(alternatives.iter().any(|alternative| loose_eq(left, alternative)))
                }
            }
        }
    }
}

/// Substring test for strings, membership test for sequences.
fn contains(left: &Value, operand: &Value) -> bool {
    match left {
        Value::String(text) => match operand {
            Value::String(needle) => text.contains(needle.as_str()),
            Value::Number(needle) => text.contains(&needle.to_string()),
            _ => false,
        },
        Value::Array(items) => items.iter().any(|item| loose_eq(item, operand)),
        _ => false,
    }
}

fn sequence_operand(operator: Operator, operand: &Value) -> StoreResult<&Vec<Value>> {
    operand
        .as_array()
        .ok_or(StoreError::OperatorOperandType {
            operator: operator.keyword(),
            expected: "a sequence operand",
        })
}

/// Evaluates one `key: condition` criterion against a document value.
pub(crate) fn matches_criterion(
    document: &Value,
    key: &str,
    condition: &Value,
) -> StoreResult<bool> {
    // A registered operator keyword takes the whole document as its left
    // side; any other key, '$'-prefixed or not, is a field path.
    if let Some(operator) = Operator::lookup(key) {
        return operator.apply(document, condition);
    }

    let Some(field_value) = resolve_path(document, key) else {
        return Ok(false);
    };

    match condition {
        Value::Object(operator_map) => {
            let Some((keyword, operand)) = operator_map.iter().next() else {
                return Err(StoreError::InvalidArgument(
                    "empty operator mapping in query".to_string(),
                ));
            };
            match Operator::lookup(keyword) {
                Some(operator) => operator.apply(field_value, operand),
                None => Err(StoreError::UnrecognizedOperator(keyword.clone())),
            }
        }
        literal => Operator::Eq.apply(field_value, literal),
    }
}

/// First-criterion evaluation of a whole criteria map; see [`Query::matches`].
fn matches_map(document: &Value, criteria: &Map<String, Value>) -> StoreResult<bool> {
    match criteria.iter().next() {
        Some((key, condition)) => matches_criterion(document, key, condition),
        None => Ok(true),
    }
}

/// An ephemeral, declarative description of which documents match.
///
/// Queries are constructed per call and never persisted. Criteria iterate
/// in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Query {
    criteria: Map<String, Value>,
}

impl Query {
    /// The empty query; matches every document.
    pub fn all() -> Self {
        Self::default()
    }

    /// Identifier shorthand: `{ "_id": id }`.
    pub fn by_id(id: impl Into<Value>) -> Self {
        let mut criteria = Map::new();
        criteria.insert(ID_FIELD.to_string(), id.into());
        Self { criteria }
    }

    /// Adds another criterion to this query.
    ///
    /// Criteria combine as a conjunction when the query is run through
    /// `Collection::find`.
    pub fn and(mut self, other: Query) -> Self {
        self.criteria.extend(other.criteria);
        self
    }

    /// Whether this query has no criteria.
    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Tests a single document against this query.
    ///
    /// Only the first criterion decides the outcome here; `Collection::find`
    /// applies the remaining criteria by narrowing candidates one criterion
    /// at a time. An empty query matches.
    ///
    /// # Errors
    ///
    /// Propagates [`StoreError::UnrecognizedOperator`] and
    /// [`StoreError::OperatorOperandType`] from operator evaluation.
    pub fn matches(&self, document: &Document) -> StoreResult<bool> {
        matches_map(document.as_value(), &self.criteria)
    }

    pub(crate) fn criteria(&self) -> &Map<String, Value> {
        &self.criteria
    }

    pub(crate) fn from_criteria(criteria: Map<String, Value>) -> Self {
        Self { criteria }
    }
}

impl TryFrom<Value> for Query {
    type Error = StoreError;

    /// Builds a query from a JSON value.
    ///
    /// Objects become the criteria mapping as-is; a bare string or number
    /// is shorthand for `{ "_id": value }`; `null` is the missing query and
    /// matches everything.
    fn try_from(value: Value) -> StoreResult<Self> {
        match value {
            Value::Object(criteria) => Ok(Self { criteria }),
            id @ (Value::String(_) | Value::Number(_)) => Ok(Self::by_id(id)),
            Value::Null => Ok(Self::all()),
            other => Err(StoreError::InvalidArgument(format!(
                "expected an object, string, or number query, got {}",
                ValueKind::of(&other).name()
            ))),
        }
    }
}

impl From<&str> for Query {
    fn from(id: &str) -> Self {
        Self::by_id(id)
    }
}

impl From<String> for Query {
    fn from(id: String) -> Self {
        Self::by_id(id)
    }
}

impl From<i64> for Query {
    fn from(id: i64) -> Self {
        Self::by_id(id)
    }
}

/// Helper struct for building queries from code.
///
/// Each constructor produces a one-criterion [`Query`]; combine them with
/// [`Query::and`] or [`Filter::or`].
///
/// ```ignore
/// use satchel::query::Filter;
///
/// let query = Filter::eq("male", true).and(Filter::gt("age", 17));
/// ```
pub struct Filter;

impl Filter {
    fn criterion(field: impl Into<String>, condition: Value) -> Query {
        let mut criteria = Map::new();
        criteria.insert(field.into(), condition);
        Query::from_criteria(criteria)
    }

    /// Matches documents where the field loosely equals the value.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Query {
        Self::criterion(field, json!({ "$eq": value.into() }))
    }

    /// Matches documents where the field does not loosely equal the value.
    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Query {
        Self::criterion(field, json!({ "$ne": value.into() }))
    }

    /// Matches documents where the field is greater than the value.
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Query {
        Self::criterion(field, json!({ "$gt": value.into() }))
    }

    /// Matches documents where the field is greater than or equal to the value.
    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Query {
        Self::criterion(field, json!({ "$gte": value.into() }))
    }

    /// Matches documents where the field is less than the value.
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Query {
        Self::criterion(field, json!({ "$lt": value.into() }))
    }

    /// Matches documents where the field is less than or equal to the value.
    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Query {
        Self::criterion(field, json!({ "$lte": value.into() }))
    }

    /// Matches documents where the string field contains the substring, or
    /// the sequence field contains the member.
    pub fn contains(field: impl Into<String>, value: impl Into<Value>) -> Query {
        Self::criterion(field, json!({ "$contains": value.into() }))
    }

    /// Matches documents where the field equals any of the values.
    pub fn any_of(field: impl Into<String>, values: impl IntoIterator<Item = Value>) -> Query {
        Self::criterion(
            field,
            json!({ "$in": values.into_iter().collect::<Vec<_>>() }),
        )
    }

    /// Matches documents where the field equals none of the values.
    pub fn none_of(field: impl Into<String>, values: impl IntoIterator<Item = Value>) -> Query {
        Self::criterion(
            field,
            json!({ "$nin": values.into_iter().collect::<Vec<_>>() }),
        )
    }

    /// Matches documents where the field's runtime kind has the given name.
    pub fn kind(field: impl Into<String>, name: impl Into<String>) -> Query {
        Self::criterion(field, json!({ "$type": name.into() }))
    }

    /// Matches documents satisfying any of the sub-queries.
    pub fn or(queries: impl IntoIterator<Item = Query>) -> Query {
        let alternatives = queries
            .into_iter()
            .map(|query| Value::Object(query.criteria))
            .collect::<Vec<_>>();
        let mut criteria = Map::new();
        criteria.insert("$or".to_string(), Value::Array(alternatives));
        Query::from_criteria(criteria)
    }
}
