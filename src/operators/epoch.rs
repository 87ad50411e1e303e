//! Epoch windowing (spec.md §4.2): assigns an epoch id to each record and
//! emits synthetic reset signals at window boundaries.
//!
//! Grounded on the reference corpus's `epoch` operator
//! (`lukemarshall2222-undergrad-research/.../builtins.rs`), which keeps the
//! same two pieces of state -- a floating boundary and an integer epoch id
//! -- and treats `boundary == 0.0` as "not yet seeded".

use crate::error::QueryError;
use crate::operator::{BoxOp, Operator};
use crate::record::Record;
use crate::value::Value;

/// Epoch windowing operator state.
///
/// # Open question resolved (see DESIGN.md)
/// The first epoch's boundary is seeded from the *first record's* timestamp
/// rather than from `0.0` -- `boundary == 0.0` doubles as the "unset"
/// sentinel, so the first emitted epoch can run up to `width` seconds past
/// an arbitrary offset. This is the literal spec.md §4.2 algorithm and what
/// every translation in the reference corpus does; an implementation that
/// wanted epoch 0 to start exactly at `t = 0` would need a separate "seeded"
/// flag, which spec.md does not ask for.
pub struct Epoch {
    width: f64,
    key_out: String,
    boundary: f64,
    eid: i64,
    next: BoxOp,
}

impl Epoch {
    pub fn new(width: f64, key_out: impl Into<String>, next: BoxOp) -> Self {
        Epoch {
            width,
            key_out: key_out.into(),
            boundary: 0.0,
            eid: 0,
            next,
        }
    }

    fn emit_reset(&mut self) -> Result<(), QueryError> {
        let reset_rec = Record::new().with(self.key_out.clone(), Value::Int(self.eid));
        self.next.reset(&reset_rec)
    }
}

impl Operator for Epoch {
    fn next(&mut self, record: &Record) -> Result<(), QueryError> {
        let t = record.require_float("time")?;
        if self.boundary == 0.0 {
            self.boundary = t + self.width;
        } else {
            while t >= self.boundary {
                self.emit_reset()?;
                self.boundary += self.width;
                self.eid += 1;
            }
        }
        let out = record.clone().with(self.key_out.clone(), Value::Int(self.eid));
        self.next.next(&out)
    }

    fn reset(&mut self, _record: &Record) -> Result<(), QueryError> {
        self.emit_reset()?;
        self.boundary = 0.0;
        self.eid = 0;
        Ok(())
    }
}

/// Build a boxed [`Epoch`] operator with width `width` seconds, labeling the
/// epoch id field `key_out` (conventionally `"eid"`).
pub fn epoch(width: f64, key_out: impl Into<String>, next: BoxOp) -> BoxOp {
    Box::new(Epoch::new(width, key_out, next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Recorder {
        nexts: Vec<Record>,
        resets: Vec<Record>,
    }

    struct Sink(Rc<RefCell<Recorder>>);
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

    #[test]
    fn twenty_tick_identity_emits_twenty_resets_in_ascending_eid() {
        let rec = Rc::new(RefCell::new(Recorder::default()));
        let sink = Box::new(Sink(rec.clone()));
        let mut op = epoch(1.0, "eid", sink);
        for i in 0..20 {
            op.next(&Record::new().with("time", Value::float(i as f64)))
                .unwrap();
        }
        op.reset(&Record::new()).unwrap();

        let r = rec.borrow();
        assert_eq!(r.nexts.len(), 20);
        assert_eq!(r.resets.len(), 20);
        for (i, reset) in r.resets.iter().enumerate() {
            assert_eq!(reset.get("eid"), Some(&Value::Int(i as i64)));
        }
    }

    #[test]
    fn rollover_emits_one_reset_per_skipped_epoch() {
        let rec = Rc::new(RefCell::new(Recorder::default()));
        let sink = Box::new(Sink(rec.clone()));
        let mut op = epoch(1.0, "eid", sink);
        op.next(&Record::new().with("time", Value::float(0.1)))
            .unwrap();
        // Jump two full epochs ahead.
        op.next(&Record::new().with("time", Value::float(2.5)))
            .unwrap();

        let r = rec.borrow();
        assert_eq!(r.resets.len(), 2);
        assert_eq!(r.resets[0].get("eid"), Some(&Value::Int(0)));
        assert_eq!(r.resets[1].get("eid"), Some(&Value::Int(1)));
        assert_eq!(r.nexts[1].get("eid"), Some(&Value::Int(2)));
    }

    #[test]
    fn external_reset_reinitializes_boundary_and_eid() {
        let rec = Rc::new(RefCell::new(Recorder::default()));
        let sink = Box::new(Sink(rec.clone()));
        let mut op = epoch(1.0, "eid", sink);
        op.next(&Record::new().with("time", Value::float(5.0)))
            .unwrap();
        op.reset(&Record::new()).unwrap();
        op.next(&Record::new().with("time", Value::float(100.0)))
            .unwrap();
        let r = rec.borrow();
        // second "next" starts a fresh epoch 0, seeded from its own timestamp
        assert_eq!(r.nexts[1].get("eid"), Some(&Value::Int(0)));
    }
}
