//! Error types and result types for store operations.
//!
//! Use [`StoreResult<T>`] as the return type for fallible operations.

use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors raised by the document store.
///
/// Programming errors (bad arguments, malformed queries, unresolvable
/// drivers) are raised synchronously to the caller of the triggering
/// operation. Driver failures surface through the committing or restoring
/// operation's result.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A caller supplied an invalid argument, such as an empty collection
    /// name or a non-object document payload.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// A query referenced an operator that is not part of the operator set.
    #[error("Unrecognised operator '{0}'")]
    UnrecognizedOperator(String),
    /// An operator was handed an operand of the wrong shape, for example a
    /// scalar where `$in` requires a sequence.
    #[error("Operator {operator} expects {expected}")]
    OperatorOperandType {
        /// The operator keyword, e.g. `$or`.
        operator: &'static str,
        /// A description of the operand shape the operator requires.
        expected: &'static str,
    },
    /// The requested driver capability is not available from the host.
    #[error("Unsupported driver: {0}")]
    UnsupportedDriver(String),
    /// No persistence driver could be resolved at store construction time.
    #[error("Driver not found: {0}")]
    DriverNotFound(String),
    /// Serialization/deserialization error for a collection snapshot.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// An error surfaced by the underlying storage driver.
    #[error("Driver error: {0}")]
    Driver(String),
}

/// A specialized `Result` type for document store operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<SerdeJsonError> for StoreError {
    fn from(err: SerdeJsonError) -> Self {
        StoreError::Serialization(err.to_string())
    }
}
