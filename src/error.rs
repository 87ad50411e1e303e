//! Error kinds for the operator runtime and its CSV boundary shims.
//!
//! There is no logging framework here -- diagnostics flow through `Display`,
//! same as the teacher's `validation.rs` hand-writes `ValidationError`
//! instead of reaching for `thiserror`. Everything that can fail in the
//! pipeline proper is fatal to the current run (spec.md §7); the CSV source
//! is the only place a malformed line may be skipped instead, and that is a
//! caller choice (see [`crate::io::csv::SkipPolicy`]).

use std::fmt;

/// The five error kinds named in spec.md §7.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// A lookup required a key absent from the record.
    MissingField(String),
    /// A value-arm extraction found the wrong arm.
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },
    /// A reducer invariant was violated (e.g. `sum_ints` on a non-`Int` field).
    BadReducerInput(String),
    /// An address/integer/line parse failed at a boundary (CSV, etc).
    ParseError(String),
    /// `read_walts_csv` was asked to run with unequal numbers of files and operators.
    ConfigError(String),
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::MissingField(key) => write!(f, "missing field {key:?}"),
            QueryError::TypeMismatch { expected, actual } => {
                write!(f, "type mismatch: expected {expected}, found {actual}")
            }
            QueryError::BadReducerInput(reason) => write!(f, "bad reducer input: {reason}"),
            QueryError::ParseError(context) => write!(f, "parse error: {context}"),
            QueryError::ConfigError(reason) => write!(f, "config error: {reason}"),
        }
    }
}

impl std::error::Error for QueryError {}

/// Convenience constructor for [`QueryError::MissingField`] that also names
/// the operator the lookup happened in, matching spec.md §7's "a diagnostic
/// naming the operator and key involved".
pub fn missing_field(operator: &str, key: &str) -> QueryError {
    QueryError::MissingField(format!("{key} (in {operator})"))
}
