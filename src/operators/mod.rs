//! The stream operator library (spec.md §2 components 2-7): the uniform
//! `next`/`reset` stages that every query in [`crate::queries`] is built
//! from.

pub mod distinct;
pub mod epoch;
pub mod groupby;
pub mod join;
pub mod stateless;

pub use distinct::distinct;
pub use epoch::epoch;
pub use groupby::{counter, filter_groups, groupby, single_group, sum_ints};
pub use join::join;
pub use stateless::{filter, map, split};
