//! Small predicate/extractor/map helpers shared across the query library,
//! factored out so each query in [`super`] reads as the pipeline table in
//! spec.md §4.7 rather than as repeated field-lookup boilerplate.

use crate::error::QueryError;
use crate::operators::join::Extractor;
use crate::record::Record;
use crate::value::Value;

/// `ipv4.proto == 6` (TCP).
pub fn is_tcp(r: &Record) -> bool {
    r.get("ipv4.proto") == Some(&Value::Int(6))
}

/// `ipv4.proto == 6 && l4.flags == flags`.
pub fn tcp_with_flags(flags: i64) -> impl FnMut(&Record) -> bool {
    move |r: &Record| is_tcp(r) && r.get("l4.flags") == Some(&Value::Int(flags))
}

/// `ipv4.proto == 6 && l4.dport == port`.
pub fn tcp_to_port(port: i64) -> impl FnMut(&Record) -> bool {
    move |r: &Record| is_tcp(r) && r.get("l4.dport") == Some(&Value::Int(port))
}

/// `ipv4.proto == 6 && l4.flags & mask == mask` (used by `completed_flows`'s
/// FIN detection, which the spec writes as `flags & 1 = 1`).
pub fn tcp_with_flag_mask(mask: i64) -> impl FnMut(&Record) -> bool {
    move |r: &Record| is_tcp(r) && matches!(r.get("l4.flags"), Some(&Value::Int(f)) if f & mask == mask)
}

/// `record[key] >= threshold`, treating a missing field as failing the
/// predicate (query filters only ever run downstream of a `groupby` that
/// just wrote `key`, so this should never trigger in practice).
pub fn field_ge(key: &'static str, threshold: i64) -> impl FnMut(&Record) -> bool {
    move |r: &Record| matches!(r.get(key), Some(&Value::Int(n)) if n >= threshold)
}

/// `record[key] <= threshold` -- the mirror of [`field_ge`], used by
/// `slowloris`'s final `bytes_per_conn <= 90` gate.
pub fn field_le(key: &'static str, threshold: i64) -> impl FnMut(&Record) -> bool {
    move |r: &Record| matches!(r.get(key), Some(&Value::Int(n)) if n <= threshold)
}

/// A `map` closure computing `out = a + b` (both `Int` fields), used by
/// `syn_flood_sonata`'s `syns+synacks` and `syns+synacks-acks` steps.
pub fn combine_ints(
    out_key: &'static str,
    a_key: &'static str,
    b_key: &'static str,
    combine: fn(i64, i64) -> i64,
) -> impl FnMut(&Record) -> Result<Record, QueryError> {
    move |r: &Record| {
        let a = r.require_int(a_key)?;
        let b = r.require_int(b_key)?;
        Ok(r.clone().with(out_key, Value::Int(combine(a, b))))
    }
}

/// A `map` closure computing `bytes_per_conn = n_bytes / n_conns` (integer
/// division; `n_conns` is guaranteed `>= 1` by `slowloris`'s upstream
/// `field_ge("n_conns", 5)` filter).
pub fn divide_ints(
    out_key: &'static str,
    numerator_key: &'static str,
    denominator_key: &'static str,
) -> impl FnMut(&Record) -> Result<Record, QueryError> {
    move |r: &Record| {
        let n = r.require_int(numerator_key)?;
        let d = r.require_int(denominator_key)?;
        Ok(r.clone().with(out_key, Value::Int(n / d)))
    }
}

/// Build a join [`Extractor`] that keys on a single renamed field (e.g.
/// `ipv4.dst -> host`) and carries another field under its own or a renamed
/// name. Missing source fields yield `Value::Empty` in the key/carry rather
/// than panicking -- extractors are plain functions with no error channel
/// (spec.md §4.6 only requires `eid_key` lookups to be fallible).
pub fn extract_rename(key_out: &'static str, key_src: &'static str, carry_out: &'static str, carry_src: &'static str) -> Extractor {
    Box::new(move |r: &Record| {
        let key = Record::new().with(key_out, r.get(key_src).cloned().unwrap_or(Value::Empty));
        let carry = Record::new().with(carry_out, r.get(carry_src).cloned().unwrap_or(Value::Empty));
        (key, carry)
    })
}
