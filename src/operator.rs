//! The uniform operator protocol every pipeline stage implements.
//!
//! Every stage -- stateless or stateful -- exposes the same two entry
//! points (spec.md §4.1). A *builder* is a plain function from a boxed
//! downstream operator to a new boxed operator; composition is ordinary
//! function application, not a dynamic graph (spec.md §9 explicitly warns
//! off reintroducing the OCaml source's infix `@=>`/`@==>` sugar as
//! operator overloading). This mirrors the teacher's `node.rs::DynOp`: a
//! small trait, boxed as a trait object at the point two stages are wired
//! together, with no registry or graph tracking topology.

use crate::error::QueryError;
use crate::record::Record;

/// A single pipeline stage.
///
/// `next` processes one input record; `reset` delivers an end-of-epoch (or
/// external) boundary signal carrying epoch metadata. Neither returns a
/// value -- all observable effects are calls into a downstream operator
/// and/or mutation of the operator's own state.
pub trait Operator {
    /// Process one input record.
    fn next(&mut self, record: &Record) -> Result<(), QueryError>;

    /// Handle an end-of-epoch (or external) reset.
    fn reset(&mut self, record: &Record) -> Result<(), QueryError>;
}

/// A boxed, owned operator -- the currency composition builders pass around.
pub type BoxOp = Box<dyn Operator>;

/// An operator builder: takes ownership of a downstream operator and
/// returns a new operator that feeds it. Queries in [`crate::queries`] are
/// built by applying these right-to-left, e.g.
/// `epoch(1.0, "eid", groupby(single_group, counter, "pkts", sink))`.
pub type Builder = Box<dyn FnOnce(BoxOp) -> BoxOp>;

/// A fan-out builder used by [`crate::operators::join::join`]: it returns a
/// *pair* of operators (the two join inputs) that share state internally.
pub type PairBuilder = Box<dyn FnOnce(BoxOp) -> (BoxOp, BoxOp)>;
