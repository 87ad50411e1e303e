//! Group-by aggregation (spec.md §4.4): per-epoch keyed reduction with a
//! pluggable key-extractor and reducer, emitting one record per group at
//! reset.
//!
//! Reducers are boxed closures over `(&Value, &Record) -> Value`, per
//! spec.md §9's note that "a tagged-enum + trait-object or function-pointer
//! approach is idiomatic; no class hierarchy is required" -- the same
//! closure-heavy shape the teacher uses for its `CombineFn` implementors in
//! `combiners/basic.rs`, generalized from Rust-generic accumulators to the
//! dynamic [`Value`] this crate's records carry.

use std::collections::HashMap;

use crate::error::QueryError;
use crate::operator::{BoxOp, Operator};
use crate::record::Record;
use crate::value::Value;

/// A pure function from a record to the sub-record used as its group key.
pub type KeyFn = Box<dyn Fn(&Record) -> Record>;

/// A reducer: combines the group's running accumulator with one more input
/// record, producing the next accumulator.
pub type Reducer = Box<dyn Fn(&Value, &Record) -> Result<Value, QueryError>>;

/// Group-by aggregation operator.
pub struct GroupBy {
    key_fn: KeyFn,
    reduce: Reducer,
    out_key: String,
    table: HashMap<Record, Value>,
    next: BoxOp,
}

impl GroupBy {
    pub fn new(key_fn: KeyFn, reduce: Reducer, out_key: impl Into<String>, next: BoxOp) -> Self {
        GroupBy {
            key_fn,
            reduce,
            out_key: out_key.into(),
            table: HashMap::new(),
            next,
        }
    }
}

impl Operator for GroupBy {
    fn next(&mut self, record: &Record) -> Result<(), QueryError> {
        let key = (self.key_fn)(record);
        let acc = self.table.get(&key).cloned().unwrap_or(Value::Empty);
        let updated = (self.reduce)(&acc, record)?;
        self.table.insert(key, updated);
        Ok(())
    }

    fn reset(&mut self, record: &Record) -> Result<(), QueryError> {
        // Emission order over groups is unspecified (spec.md §4.4).
        for (key, value) in self.table.drain() {
            let out_field = Record::new().with(self.out_key.clone(), value);
            let merged = record.merge(&key).merge(&out_field);
            self.next.next(&merged)?;
        }
        self.next.reset(record)
    }
}

/// Build a boxed [`GroupBy`] operator.
pub fn groupby(key_fn: KeyFn, reduce: Reducer, out_key: impl Into<String>, next: BoxOp) -> BoxOp {
    Box::new(GroupBy::new(key_fn, reduce, out_key, next))
}

/// Pre-supplied key-extractor: every record belongs to the single, empty
/// group.
pub fn single_group() -> KeyFn {
    Box::new(|_record: &Record| Record::new())
}

/// Pre-supplied key-extractor: the sub-record restricted to `keys`. Keys
/// absent from the input are silently absent from the key (no error).
pub fn filter_groups(keys: Vec<&'static str>) -> KeyFn {
    Box::new(move |record: &Record| record.project(&keys))
}

/// Pre-supplied reducer: increments an integer counter.
///
/// `Empty -> Int(1)`; `Int(n) -> Int(n+1)`. Any other accumulator shape is
/// returned unchanged -- a defensive no-op, not an error. This asymmetry
/// with [`sum_ints`] is intentional (see DESIGN.md Open Question 2):
/// `counter` never needs to read the input record's fields, so there is
/// nothing for it to fail on.
pub fn counter() -> Reducer {
    Box::new(|acc: &Value, _record: &Record| match acc {
        Value::Empty => Ok(Value::Int(1)),
        Value::Int(n) => Ok(Value::Int(n + 1)),
        other => Ok(other.clone()),
    })
}

/// Pre-supplied reducer: sums an `Int` field named `key` across the group.
///
/// `Empty -> Int(0)`; `Int(n)` with `record[key] = Int(m) -> Int(n + m)`.
/// Unlike [`counter`], a missing or non-`Int` field is a
/// [`QueryError::BadReducerInput`] -- this reducer's whole job is reading
/// that field, so there is no sensible no-op fallback (DESIGN.md Open
/// Question 2).
pub fn sum_ints(key: &'static str) -> Reducer {
    Box::new(move |acc: &Value, record: &Record| {
        let n = match acc {
            Value::Empty => 0,
            Value::Int(n) => *n,
            other => {
                return Err(QueryError::BadReducerInput(format!(
                    "sum_ints: unexpected accumulator {other:?}"
                )))
            }
        };
        let m = record.get(key).ok_or_else(|| {
            QueryError::BadReducerInput(format!("sum_ints: field {key:?} is missing"))
        })?;
        let m = match m {
            Value::Int(m) => *m,
            other => {
                return Err(QueryError::BadReducerInput(format!(
                    "sum_ints: field {key:?} is {}, not Int",
                    other.arm_name()
                )))
            }
        };
        Ok(Value::Int(n + m))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder(Rc<RefCell<Vec<Record>>>);
    impl Operator for Recorder {
        fn next(&mut self, record: &Record) -> Result<(), QueryError> {
            self.0.borrow_mut().push(record.clone());
            Ok(())
        }
        fn reset(&mut self, _record: &Record) -> Result<(), QueryError> {
            Ok(())
        }
    }

    #[test]
    fn count_pkts_single_epoch_counts_five_records() {
        let out = Rc::new(RefCell::new(Vec::new()));
        let sink = Box::new(Recorder(out.clone()));
        let mut op = groupby(single_group(), counter(), "pkts", sink);
        for _ in 0..5 {
            op.next(&Record::new().with("time", Value::float(0.5)))
                .unwrap();
        }
        op.reset(&Record::new().with("eid", Value::Int(0))).unwrap();

        let out = out.borrow();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].get("pkts"), Some(&Value::Int(5)));
        assert_eq!(out[0].get("eid"), Some(&Value::Int(0)));
    }

    #[test]
    fn sum_ints_errors_on_non_int_field() {
        let out = Rc::new(RefCell::new(Vec::new()));
        let sink = Box::new(Recorder(out.clone()));
        let mut op = groupby(single_group(), sum_ints("len"), "total", sink);
        let bad = Record::new().with("len", Value::float(1.0));
        assert!(matches!(
            op.next(&bad).unwrap_err(),
            QueryError::BadReducerInput(_)
        ));
    }

    #[test]
    fn sum_ints_errors_with_bad_reducer_input_on_missing_field() {
        let out = Rc::new(RefCell::new(Vec::new()));
        let sink = Box::new(Recorder(out.clone()));
        let mut op = groupby(single_group(), sum_ints("len"), "total", sink);
        let missing = Record::new();
        assert!(matches!(
            op.next(&missing).unwrap_err(),
            QueryError::BadReducerInput(_)
        ));
    }

    #[test]
    fn filter_groups_projects_a_subset_of_keys() {
        let keyfn = filter_groups(vec!["src", "dst"]);
        let r = Record::new()
            .with("src", Value::Int(1))
            .with("dst", Value::Int(2))
            .with("len", Value::Int(3));
        let k = keyfn(&r);
        assert_eq!(k.len(), 2);
        assert!(k.get("len").is_none());
    }
}
