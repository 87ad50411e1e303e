//! The query library (spec.md §2 component 8): every query is a plain
//! composition of the operators in [`crate::operators`], parameterized by
//! epoch width and, for the threshold-bearing queries, a detection
//! threshold via [`config::Config`].

pub mod config;
pub mod multi;
pub mod simple;
mod support;

pub use config::Config;
pub use multi::{completed_flows, slowloris, syn_flood_sonata};
pub use simple::{
    count_pkts, count_pkts_body, ddos, ddos_body, distinct_srcs, distinct_srcs_body, ident,
    pkts_per_src_dst, pkts_per_src_dst_body, port_scan, port_scan_body, q3, q3_body, q4, q4_body,
    ssh_brute_force, ssh_brute_force_body, super_spreader, super_spreader_body, tcp_new_cons,
    tcp_new_cons_body,
};
