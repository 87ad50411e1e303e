//! The ordered, heterogeneous record ("tuple") that flows through every operator.
//!
//! A [`Record`] is a mapping from field name to [`Value`]. It backs onto a
//! `BTreeMap` rather than a `HashMap` for two reasons spec.md §3/§9 both call
//! out: iteration must be stable (so CSV headers and rows line up), and the
//! same record must hash and compare equal regardless of the order its
//! fields were inserted in -- `BTreeMap`'s own `Hash`/`Eq` impls already give
//! us that for free by iterating in sorted key order.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::QueryError;
use crate::value::Value;

/// An ordered, heterogeneous mapping from field name to [`Value`].
///
/// Records are value-typed: [`Record::merge`] and [`Record::project`] both
/// return new records rather than mutating in place. `Serialize`/
/// `Deserialize` derive straight through the backing `BTreeMap`, giving test
/// fixtures a JSON literal form (see [`Value`]'s doc comment).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record(BTreeMap<String, Value>);

impl Record {
    /// An empty record.
    pub fn new() -> Self {
        Record(BTreeMap::new())
    }

    /// Build a record from `(name, value)` pairs.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        let mut map = BTreeMap::new();
        for (k, v) in pairs {
            map.insert(k.into(), v);
        }
        Record(map)
    }

    /// Insert or overwrite a field, returning `self` for chaining.
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    /// Insert or overwrite a field in place.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    /// Look up a field by name.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Look up a field, failing with [`QueryError::MissingField`] if absent.
    pub fn require(&self, key: &str) -> Result<&Value, QueryError> {
        self.0
            .get(key)
            .ok_or_else(|| QueryError::MissingField(key.to_string()))
    }

    /// Look up an `Int` field, failing if absent or of the wrong arm.
    pub fn require_int(&self, key: &str) -> Result<i64, QueryError> {
        self.require(key)?.as_int()
    }

    /// Look up a `Float` field, failing if absent or of the wrong arm.
    pub fn require_float(&self, key: &str) -> Result<f64, QueryError> {
        self.require(key)?.as_float()
    }

    /// True if the named field is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Iterate over `(name, value)` pairs in sorted-key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Left-biased union: for every key present in `self`, `self`'s value
    /// wins; keys present only in `other` are added. Used by group-by,
    /// distinct, and join to rebuild output records (spec.md §3).
    pub fn merge(&self, other: &Record) -> Record {
        let mut out = other.0.clone();
        for (k, v) in &self.0 {
            out.insert(k.clone(), v.clone());
        }
        Record(out)
    }

    /// The sub-record restricted to the listed keys. Keys absent from
    /// `self` are silently absent from the result (used by
    /// [`crate::operators::groupby::filter_groups`] and join key extractors).
    pub fn project(&self, keys: &[&str]) -> Record {
        let mut out = BTreeMap::new();
        for &k in keys {
            if let Some(v) = self.0.get(k) {
                out.insert(k.to_string(), v.clone());
            }
        }
        Record(out)
    }

    /// A copy of `self` with the listed keys removed. Keys absent from
    /// `self` are silently ignored. Used by `ident` to drop `eth.src`/
    /// `eth.dst`.
    pub fn without(&self, keys: &[&str]) -> Record {
        let mut out = self.0.clone();
        for &k in keys {
            out.remove(k);
        }
        Record(out)
    }
}

impl fmt::Display for Record {
    /// `"key1" => value1, "key2" => value2, ...` -- the dump sink format
    /// from spec.md §6, reused for `{:?}`-free debugging anywhere a record
    /// needs to be shown to a human.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (k, v) in self.iter() {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{k:?} => {v}")?;
        }
        Ok(())
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Record(iter.into_iter().collect())
    }
}
