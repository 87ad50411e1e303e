//! A streaming network-telemetry query engine.
//!
//! Packet records flow through composable stream operators -- epoch
//! windowing, filter, map, group-by-aggregate, distinct, split, and a
//! temporal equi-join -- each exposing the same two-method contract
//! (`next`/`reset`, see [`operator::Operator`]). A query is nothing more
//! than one of these operators applied to another: there is no dynamic
//! pipeline graph, no planner, and no parallel runner. Composition is
//! ordinary function application, right-to-left from the terminal sink.
//!
//! ```
//! use sonata::operator::Operator;
//! use sonata::operators::{counter, epoch, groupby, single_group};
//! use sonata::record::Record;
//! use sonata::testing::recording_sink;
//! use sonata::value::Value;
//!
//! let (sink, recording) = recording_sink();
//! let mut count_pkts = epoch(1.0, "eid", groupby(single_group(), counter(), "pkts", sink));
//! for _ in 0..5 {
//!     count_pkts
//!         .next(&Record::new().with("time", Value::float(0.5)))
//!         .unwrap();
//! }
//! count_pkts.reset(&Record::new().with("eid", Value::Int(0))).unwrap();
//! assert_eq!(recording.borrow().nexts[0].get("pkts"), Some(&Value::Int(5)));
//! ```
//!
//! The eleven counting and intrusion-detection queries named in the Sonata
//! literature (`tcp_new_cons`, `ssh_brute_force`, `super_spreader`,
//! `port_scan`, `ddos`, and friends), plus the three multi-stream queries
//! (`syn_flood_sonata`, `completed_flows`, `slowloris`), are pre-built in
//! [`queries`].

pub mod error;
pub mod io;
pub mod operator;
pub mod operators;
pub mod queries;
pub mod record;
pub mod testing;
pub mod value;

pub use error::QueryError;
pub use operator::Operator;
pub use record::Record;
pub use value::Value;
