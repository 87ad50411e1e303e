//! The heterogeneous value variant that every [`crate::record::Record`] field holds.
//!
//! Packet telemetry mixes timestamps, counters, addresses, and a sentinel for
//! "no accumulator yet" in a single record shape, so fields are not typed
//! individually -- every field is a [`Value`], and operators extract the arm
//! they expect or fail with [`crate::error::QueryError::TypeMismatch`].

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

use crate::error::QueryError;

/// A single telemetry field value.
///
/// `Float` and `Int` are the two numeric arms (kept distinct because the
/// wire format and the query library care about the difference: epoch ids
/// and thresholds are `Int`, timestamps are `Float`). `Empty` is the
/// sentinel accumulator for reducers that have not seen an input yet; it is
/// equal only to itself.
///
/// `Serialize`/`Deserialize` are derived (not used by any operator or CSV
/// shim, which all go through [`fmt::Display`]/[`Value::ipv4_or_zero`]
/// instead) purely so test fixtures can be expressed as JSON literals, the
/// way the teacher's own fixtures do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    /// A fractional scalar -- wall-clock timestamps, in seconds.
    Float(OrderedFloat<f64>),
    /// A signed integer -- counters, ports, epoch ids, flag bitfields.
    Int(i64),
    /// An IPv4 address, stored as its 32-bit representation.
    IPv4(Ipv4Addr),
    /// An Ethernet MAC address.
    Mac([u8; 6]),
    /// Sentinel value used as the initial reducer accumulator.
    Empty,
}

impl Value {
    /// Construct a [`Value::Float`] from a plain `f64`.
    pub fn float(v: f64) -> Self {
        Value::Float(OrderedFloat(v))
    }

    /// Construct a [`Value::IPv4`], treating the literal string `"0"` as
    /// `Int(0)` per Walt's canonical CSV format (spec.md §6).
    pub fn ipv4_or_zero(text: &str) -> Result<Self, QueryError> {
        if text == "0" {
            return Ok(Value::Int(0));
        }
        text.parse::<Ipv4Addr>()
            .map(Value::IPv4)
            .map_err(|e| QueryError::ParseError(format!("invalid IPv4 address {text:?}: {e}")))
    }

    /// The arm name, used in [`QueryError::TypeMismatch`] diagnostics.
    pub fn arm_name(&self) -> &'static str {
        match self {
            Value::Float(_) => "Float",
            Value::Int(_) => "Int",
            Value::IPv4(_) => "IPv4",
            Value::Mac(_) => "MAC",
            Value::Empty => "Empty",
        }
    }

    /// Extract the `f64` payload of a `Float` arm, or fail.
    pub fn as_float(&self) -> Result<f64, QueryError> {
        match self {
            Value::Float(f) => Ok(f.0),
            other => Err(QueryError::TypeMismatch {
                expected: "Float",
                actual: other.arm_name(),
            }),
        }
    }

    /// Extract the `i64` payload of an `Int` arm, or fail.
    pub fn as_int(&self) -> Result<i64, QueryError> {
        match self {
            Value::Int(n) => Ok(*n),
            other => Err(QueryError::TypeMismatch {
                expected: "Int",
                actual: other.arm_name(),
            }),
        }
    }
}

/// Total order over `Value`, used as a hash/sort key for grouping records.
///
/// Order between distinct arms is arbitrary but fixed (arms are ranked in
/// declaration order below); within an arm, natural order applies. `Empty`
/// compares equal only to `Empty`.
impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        fn rank(v: &Value) -> u8 {
            match v {
                Value::Float(_) => 0,
                Value::Int(_) => 1,
                Value::IPv4(_) => 2,
                Value::Mac(_) => 3,
                Value::Empty => 4,
            }
        }
        match (self, other) {
            (Value::Float(a), Value::Float(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::IPv4(a), Value::IPv4(b)) => a.cmp(b),
            (Value::Mac(a), Value::Mac(b)) => a.cmp(b),
            (Value::Empty, Value::Empty) => std::cmp::Ordering::Equal,
            _ => rank(self).cmp(&rank(other)),
        }
    }
}

/// Formats a MAC address as colon-separated uppercase hex octets, matching
/// the reference implementation's `string_of_mac`.
fn format_mac(bytes: &[u8; 6]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(":")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Six fractional digits, to round-trip through the reference CSV output.
            Value::Float(v) => write!(f, "{:.6}", v.0),
            Value::Int(n) => write!(f, "{n}"),
            Value::IPv4(addr) => write!(f, "{addr}"),
            Value::Mac(bytes) => write!(f, "{}", format_mac(bytes)),
            Value::Empty => write!(f, "Empty"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_display_has_six_fractional_digits() {
        assert_eq!(Value::float(1.5).to_string(), "1.500000");
        assert_eq!(Value::float(0.0).to_string(), "0.000000");
    }

    #[test]
    fn mac_display_is_colon_separated_uppercase_hex() {
        let v = Value::Mac([0xde, 0xad, 0xbe, 0xef, 0x00, 0x01]);
        assert_eq!(v.to_string(), "DE:AD:BE:EF:00:01");
    }

    #[test]
    fn ipv4_or_zero_treats_literal_zero_as_int() {
        assert_eq!(Value::ipv4_or_zero("0").unwrap(), Value::Int(0));
        assert_eq!(
            Value::ipv4_or_zero("10.0.0.1").unwrap(),
            Value::IPv4("10.0.0.1".parse().unwrap())
        );
        assert!(Value::ipv4_or_zero("not-an-ip").is_err());
    }

    #[test]
    fn empty_equals_only_empty() {
        assert_eq!(Value::Empty, Value::Empty);
        assert_ne!(Value::Empty, Value::Int(0));
    }

    #[test]
    fn ordering_within_arm_is_natural() {
        assert!(Value::Int(1) < Value::Int(2));
        assert!(Value::float(1.0) < Value::float(2.0));
    }

    #[test]
    fn type_extraction_errors_name_both_arms() {
        let err = Value::Int(3).as_float().unwrap_err();
        match err {
            QueryError::TypeMismatch { expected, actual } => {
                assert_eq!(expected, "Float");
                assert_eq!(actual, "Int");
            }
            _ => panic!("wrong error kind"),
        }
    }
}
