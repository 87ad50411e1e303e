//! Test-only harness for driving operator pipelines (grounded in the
//! teacher's dedicated `testing` module: a collecting sink plus a small set
//! of assertion helpers, generalized from `Pipeline`/`PCollection` fixtures
//! to this crate's `next`/`reset` operators).
//!
//! Not part of the default build surface for downstream consumers of the
//! library beyond tests -- it exists so query and operator tests can build
//! a pipeline, feed it a vector of records, and inspect what reached the
//! end without hand-rolling a recorder in every test module.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::QueryError;
use crate::operator::{BoxOp, Operator};
use crate::record::Record;

/// A terminal operator that records every `next` and `reset` call it sees,
/// in order, without forwarding further.
#[derive(Default)]
pub struct Recording {
    pub nexts: Vec<Record>,
    pub resets: Vec<Record>,
}

struct RecordingSink(Rc<RefCell<Recording>>);

impl Operator for RecordingSink {
    fn next(&mut self, record: &Record) -> Result<(), QueryError> {
        self.0.borrow_mut().nexts.push(record.clone());
        Ok(())
    }

    fn reset(&mut self, record: &Record) -> Result<(), QueryError> {
        self.0.borrow_mut().resets.push(record.clone());
        Ok(())
    }
}

/// Build a boxed recording sink plus a shared handle to inspect it after
/// the pipeline has run.
pub fn recording_sink() -> (BoxOp, Rc<RefCell<Recording>>) {
    let recording = Rc::new(RefCell::new(Recording::default()));
    (Box::new(RecordingSink(recording.clone())), recording)
}

/// Build a pipeline with `build`, feed it `inputs` in order via `next`,
/// then deliver `final_reset` via `reset`, and return everything the
/// recording sink observed.
pub fn collect(
    build: impl FnOnce(BoxOp) -> BoxOp,
    inputs: &[Record],
    final_reset: &Record,
) -> Result<Recording, QueryError> {
    let (sink, recording) = recording_sink();
    let mut head = build(sink);
    for record in inputs {
        head.next(record)?;
    }
    head.reset(final_reset)?;
    drop(head);
    Ok(Rc::try_unwrap(recording)
        .unwrap_or_else(|_| panic!("recording sink handle still shared after pipeline run"))
        .into_inner())
}

/// Assert that `actual` and `expected` contain the same records with the
/// same multiplicity, ignoring order -- used wherever the system under
/// test's output order is unspecified (group-by and distinct emission at
/// reset, spec.md §4.4/§4.5).
pub fn assert_records_unordered_eq(actual: &[Record], expected: &[Record]) {
    fn tally(records: &[Record]) -> HashMap<&Record, usize> {
        let mut counts = HashMap::new();
        for r in records {
            *counts.entry(r).or_insert(0) += 1;
        }
        counts
    }
    let actual_tally = tally(actual);
    let expected_tally = tally(expected);
    assert_eq!(
        actual_tally, expected_tally,
        "unordered record sets differ\n  actual:   {actual:?}\n  expected: {expected:?}"
    );
}
