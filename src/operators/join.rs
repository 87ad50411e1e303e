//! Temporal equi-join (spec.md §4.6) -- the hard part.
//!
//! Two paired input operators share a state triple: two hash tables of
//! pending records and two epoch watermarks (spec.md §9: "joint exclusive
//! ownership... the pair must be constructed together and kept in the same
//! single-threaded context"). That's modeled here as `Rc<RefCell<_>>`
//! rather than the teacher's `Arc<Mutex<_>>` (used in `pipeline.rs` for a
//! graph that genuinely gets read from multiple Rayon worker threads) --
//! this runtime never crosses a thread boundary, so the cheaper
//! single-threaded cell is the correct idiom, exactly as spec.md §9
//! prescribes.
//!
//! The watermark-advance loop is the single most delicate piece of this
//! crate: it guarantees the shared downstream sees exactly one
//! `reset(eid=E)` per completed epoch `E`, emitted only once *both* sides
//! have moved past `E`, regardless of how left/right arrivals interleave.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::QueryError;
use crate::operator::{BoxOp, Operator};
use crate::record::Record;
use crate::value::Value;

/// Maps one side's input record to `(join_key, carry)`: the subset used for
/// matching and the subset preserved through to the join output.
pub type Extractor = Box<dyn Fn(&Record) -> (Record, Record)>;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

#[derive(Default)]
struct JoinShared {
    table_left: HashMap<Record, Record>,
    table_right: HashMap<Record, Record>,
    watermark_left: i64,
    watermark_right: i64,
}

impl JoinShared {
    fn watermark(&self, side: Side) -> i64 {
        match side {
            Side::Left => self.watermark_left,
            Side::Right => self.watermark_right,
        }
    }

    fn other_watermark(&self, side: Side) -> i64 {
        match side {
            Side::Left => self.watermark_right,
            Side::Right => self.watermark_left,
        }
    }

    fn set_watermark(&mut self, side: Side, value: i64) {
        match side {
            Side::Left => self.watermark_left = value,
            Side::Right => self.watermark_right = value,
        }
    }

    fn own_table(&mut self, side: Side) -> &mut HashMap<Record, Record> {
        match side {
            Side::Left => &mut self.table_left,
            Side::Right => &mut self.table_right,
        }
    }

    fn other_table(&mut self, side: Side) -> &mut HashMap<Record, Record> {
        match side {
            Side::Left => &mut self.table_right,
            Side::Right => &mut self.table_left,
        }
    }
}

/// Advance `side`'s watermark up to (but not past) `target`, emitting one
/// `reset(eid=E)` downstream for each epoch `E` that the *other* side has
/// already closed. This is called identically from both `next` and `reset`
/// (spec.md §4.6 step 2, and the mirrored `reset` clause).
fn advance_watermark(
    shared: &Rc<RefCell<JoinShared>>,
    downstream: &Rc<RefCell<BoxOp>>,
    side: Side,
    eid_key: &str,
    target: i64,
) -> Result<(), QueryError> {
    loop {
        let (current, other) = {
            let s = shared.borrow();
            (s.watermark(side), s.other_watermark(side))
        };
        if target <= current {
            break;
        }
        if other > current {
            let reset_rec = Record::new().with(eid_key, Value::Int(current));
            downstream.borrow_mut().reset(&reset_rec)?;
        }
        shared.borrow_mut().set_watermark(side, current + 1);
    }
    Ok(())
}

/// One half of a join pair. `side` picks which table is "own" (where
/// unmatched carries are stashed) and which is "other" (probed for a
/// match); the logic is otherwise identical for both sides.
struct JoinEndpoint {
    side: Side,
    extract: Extractor,
    eid_key: String,
    shared: Rc<RefCell<JoinShared>>,
    downstream: Rc<RefCell<BoxOp>>,
}

impl Operator for JoinEndpoint {
    fn next(&mut self, record: &Record) -> Result<(), QueryError> {
        let (key, carry) = (self.extract)(record);
        let eid = record.require_int(&self.eid_key)?;
        advance_watermark(&self.shared, &self.downstream, self.side, &self.eid_key, eid)?;

        let lookup_key = key.merge(&Record::new().with(self.eid_key.clone(), Value::Int(eid)));

        let matched = {
            let mut shared = self.shared.borrow_mut();
            shared.other_table(self.side).remove(&lookup_key)
        };
        match matched {
            Some(other_carry) => {
                let merged = lookup_key.merge(&carry).merge(&other_carry);
                self.downstream.borrow_mut().next(&merged)?;
            }
            None => {
                self.shared
                    .borrow_mut()
                    .own_table(self.side)
                    .insert(lookup_key, carry);
            }
        }
        Ok(())
    }

    fn reset(&mut self, record: &Record) -> Result<(), QueryError> {
        let eid = record.require_int(&self.eid_key)?;
        advance_watermark(&self.shared, &self.downstream, self.side, &self.eid_key, eid)
    }
}

/// Build a join pair: `(left_operator, right_operator)`, both sharing the
/// state described above and both feeding the same `downstream`.
///
/// `eid_key` names the epoch-id field both input streams are expected to
/// carry (conventionally `"eid"`). A missing or non-`Int` `eid_key` in an
/// input record is a programming error and surfaces as
/// [`QueryError::MissingField`]/[`QueryError::TypeMismatch`] -- the join
/// never silently drops records (spec.md §4.6 "Failure semantics").
pub fn join(
    eid_key: impl Into<String>,
    left_extract: Extractor,
    right_extract: Extractor,
    downstream: BoxOp,
) -> (BoxOp, BoxOp) {
    let eid_key = eid_key.into();
    let shared = Rc::new(RefCell::new(JoinShared::default()));
    let downstream = Rc::new(RefCell::new(downstream));

    let left = JoinEndpoint {
        side: Side::Left,
        extract: left_extract,
        eid_key: eid_key.clone(),
        shared: shared.clone(),
        downstream: downstream.clone(),
    };
    let right = JoinEndpoint {
        side: Side::Right,
        extract: right_extract,
        eid_key,
        shared,
        downstream,
    };
    (Box::new(left), Box::new(right))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell as StdRefCell;

    #[derive(Default)]
    struct Recorder {
        nexts: Vec<Record>,
        resets: Vec<Record>,
    }

    struct Sink(Rc<StdRefCell<Recorder>>);
    impl Operator for Sink {
        fn next(&mut self, record: &Record) -> Result<(), QueryError> {
            self.0.borrow_mut().nexts.push(record.clone());
            Ok(())
        }
        fn reset(&mut self, record: &Record) -> Result<(), QueryError> {
            self.0.borrow_mut().resets.push(record.clone());
            Ok(())
        }
    }

    fn extractor(carry_key: &'static str) -> Extractor {
        Box::new(move |r: &Record| {
            let key = r.project(&["a"]);
            let carry = r.project(&[carry_key]);
            (key, carry)
        })
    }

    #[test]
    fn left_first_arrival_pairs_and_emits_gated_reset() {
        let rec = Rc::new(StdRefCell::new(Recorder::default()));
        let sink = Box::new(Sink(rec.clone()));
        let (mut left, mut right) = join("eid", extractor("x"), extractor("y"), sink);

        left.next(&Record::new().with("a", Value::Int(1)).with("x", Value::Int(100)).with("eid", Value::Int(0)))
            .unwrap();
        left.reset(&Record::new().with("eid", Value::Int(1))).unwrap();
        right
            .next(&Record::new().with("a", Value::Int(1)).with("y", Value::Int(200)).with("eid", Value::Int(0)))
            .unwrap();
        right.reset(&Record::new().with("eid", Value::Int(1))).unwrap();

        let r = rec.borrow();
        assert_eq!(r.nexts.len(), 1);
        assert_eq!(r.nexts[0].get("x"), Some(&Value::Int(100)));
        assert_eq!(r.nexts[0].get("y"), Some(&Value::Int(200)));
        assert_eq!(r.nexts[0].get("a"), Some(&Value::Int(1)));
        assert_eq!(r.resets.len(), 1);
        assert_eq!(r.resets[0].get("eid"), Some(&Value::Int(0)));
    }

    #[test]
    fn unmatched_entries_persist_across_epoch_boundaries() {
        let rec = Rc::new(StdRefCell::new(Recorder::default()));
        let sink = Box::new(Sink(rec.clone()));
        let (mut left, mut right) = join("eid", extractor("x"), extractor("y"), sink);

        left.next(&Record::new().with("a", Value::Int(9)).with("x", Value::Int(1)).with("eid", Value::Int(0)))
            .unwrap();
        left.reset(&Record::new().with("eid", Value::Int(1))).unwrap();
        right.reset(&Record::new().with("eid", Value::Int(1))).unwrap();
        // Matching right arrives a full epoch later, still at eid 0.
        right
            .next(&Record::new().with("a", Value::Int(9)).with("y", Value::Int(2)).with("eid", Value::Int(0)))
            .unwrap();

        let r = rec.borrow();
        assert_eq!(r.nexts.len(), 1);
        assert_eq!(r.nexts[0].get("x"), Some(&Value::Int(1)));
        assert_eq!(r.nexts[0].get("y"), Some(&Value::Int(2)));
    }

    #[test]
    fn missing_eid_key_is_a_fatal_error() {
        let rec = Rc::new(StdRefCell::new(Recorder::default()));
        let sink = Box::new(Sink(rec.clone()));
        let (mut left, _right) = join("eid", extractor("x"), extractor("y"), sink);
        assert!(left.next(&Record::new().with("a", Value::Int(1))).is_err());
    }
}
