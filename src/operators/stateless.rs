//! Stateless, record-at-a-time operators: filter, map, split (spec.md §4.3).
//!
//! None of these hold state across calls, so each is a thin struct wrapping
//! a downstream operator plus a closure.

use crate::error::QueryError;
use crate::operator::{BoxOp, Operator};
use crate::record::Record;

/// `filter(pred, next)`: forwards a record to `next` iff `pred(record)` is
/// true. Resets always forward unchanged.
pub struct Filter<P> {
    pred: P,
    next: BoxOp,
}

impl<P> Filter<P>
where
    P: FnMut(&Record) -> bool + 'static,
{
    pub fn new(pred: P, next: BoxOp) -> Self {
        Filter { pred, next }
    }
}

impl<P> Operator for Filter<P>
where
    P: FnMut(&Record) -> bool,
{
    fn next(&mut self, record: &Record) -> Result<(), QueryError> {
        if (self.pred)(record) {
            self.next.next(record)?;
        }
        Ok(())
    }

    fn reset(&mut self, record: &Record) -> Result<(), QueryError> {
        self.next.reset(record)
    }
}

/// Build a boxed [`Filter`] operator.
pub fn filter<P>(pred: P, next: BoxOp) -> BoxOp
where
    P: FnMut(&Record) -> bool + 'static,
{
    Box::new(Filter::new(pred, next))
}

/// `map(f, next)`: forwards `f(record)` to `next`. Resets forward unchanged.
pub struct Map<F> {
    f: F,
    next: BoxOp,
}

impl<F> Map<F>
where
    F: FnMut(&Record) -> Result<Record, QueryError> + 'static,
{
    pub fn new(f: F, next: BoxOp) -> Self {
        Map { f, next }
    }
}

impl<F> Operator for Map<F>
where
    F: FnMut(&Record) -> Result<Record, QueryError>,
{
    fn next(&mut self, record: &Record) -> Result<(), QueryError> {
        let mapped = (self.f)(record)?;
        self.next.next(&mapped)
    }

    fn reset(&mut self, record: &Record) -> Result<(), QueryError> {
        self.next.reset(record)
    }
}

/// Build a boxed [`Map`] operator.
pub fn map<F>(f: F, next: BoxOp) -> BoxOp
where
    F: FnMut(&Record) -> Result<Record, QueryError> + 'static,
{
    Box::new(Map::new(f, next))
}

/// `split(left, right)`: sends both `next` and `reset` to both branches, in
/// left-then-right order. Used to feed a single upstream into two distinct
/// query sub-pipelines (e.g. the three streams that feed `syn_flood_sonata`).
pub struct Split {
    left: BoxOp,
    right: BoxOp,
}

impl Split {
    pub fn new(left: BoxOp, right: BoxOp) -> Self {
        Split { left, right }
    }
}

impl Operator for Split {
    fn next(&mut self, record: &Record) -> Result<(), QueryError> {
        self.left.next(record)?;
        self.right.next(record)
    }

    fn reset(&mut self, record: &Record) -> Result<(), QueryError> {
        self.left.reset(record)?;
        self.right.reset(record)
    }
}

/// Build a boxed [`Split`] operator.
pub fn split(left: BoxOp, right: BoxOp) -> BoxOp {
    Box::new(Split::new(left, right))
}
