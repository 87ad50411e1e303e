//! The three multi-stream queries from spec.md §4.7: each returns one root
//! operator per named input stream (to be fed from its own CSV source, not
//! from a `split` of a single stream), so these builders return tuples
//! instead of a single [`BoxOp`].

use crate::operator::BoxOp;
use crate::operators::groupby::{filter_groups, sum_ints};
use crate::operators::join::join;
use crate::operators::{counter, distinct, epoch, filter, groupby, map};
use crate::queries::config::{
    COMPLETED_FLOWS_THRESHOLD, SLOWLORIS_MAX_BYTES_PER_CONN, SLOWLORIS_MIN_BYTES,
    SLOWLORIS_MIN_CONNS, SYN_FLOOD_THRESHOLD,
};
use crate::queries::support::{
    combine_ints, divide_ints, extract_rename, field_ge, field_le, is_tcp, tcp_with_flag_mask,
    tcp_with_flags,
};

/// Sonata-6: three streams (SYN, SYN-ACK, ACK) joined through two chained
/// joins. Returns `(syns, synacks, acks)` -- the three root operators to
/// feed from the three corresponding CSV sources.
///
/// First join keys on `host` (`ipv4.dst` from the SYN side, `ipv4.src` from
/// the SYN-ACK side), carrying `syns`/`synacks`; a `map` combines them into
/// `syns+synacks`. That result feeds a second join, keyed again on `host`
/// (passed through) against the ACK stream's `ipv4.dst`, carrying
/// `syns+synacks`/`acks`; a final `map`+`filter` computes
/// `syns+synacks-acks` and gates at [`SYN_FLOOD_THRESHOLD`].
pub fn syn_flood_sonata(epoch_width: f64, next: BoxOp) -> (BoxOp, BoxOp, BoxOp) {
    let stage2_tail = filter(field_ge("syns+synacks-acks", SYN_FLOOD_THRESHOLD), next);
    let stage2_tail = map(
        combine_ints("syns+synacks-acks", "syns+synacks", "acks", |a, b| a - b),
        stage2_tail,
    );
    let (join2_left, join2_right) = join(
        "eid",
        extract_rename("host", "host", "syns+synacks", "syns+synacks"),
        extract_rename("host", "ipv4.dst", "acks", "acks"),
        stage2_tail,
    );

    let stage1_tail = map(
        combine_ints("syns+synacks", "syns", "synacks", |a, b| a + b),
        join2_left,
    );
    let (join1_left, join1_right) = join(
        "eid",
        extract_rename("host", "ipv4.dst", "syns", "syns"),
        extract_rename("host", "ipv4.src", "synacks", "synacks"),
        stage1_tail,
    );

    let syns_root = epoch(
        epoch_width,
        "eid",
        filter(
            tcp_with_flags(2),
            groupby(filter_groups(vec!["ipv4.dst"]), counter(), "syns", join1_left),
        ),
    );
    let synacks_root = epoch(
        epoch_width,
        "eid",
        filter(
            tcp_with_flags(18),
            groupby(
                filter_groups(vec!["ipv4.src"]),
                counter(),
                "synacks",
                join1_right,
            ),
        ),
    );
    let acks_root = epoch(
        epoch_width,
        "eid",
        filter(
            tcp_with_flags(16),
            groupby(filter_groups(vec!["ipv4.dst"]), counter(), "acks", join2_right),
        ),
    );

    (syns_root, synacks_root, acks_root)
}

/// Two streams (SYN, FIN) joined on `host`, detecting connections opened
/// but never cleanly closed within the epoch. Returns `(syns, fins)`.
pub fn completed_flows(epoch_width: f64, next: BoxOp) -> (BoxOp, BoxOp) {
    let tail = filter(field_ge("diff", COMPLETED_FLOWS_THRESHOLD), next);
    let tail = map(combine_ints("diff", "syns", "fins", |a, b| a - b), tail);
    let (join_left, join_right) = join(
        "eid",
        extract_rename("host", "ipv4.dst", "syns", "syns"),
        extract_rename("host", "ipv4.src", "fins", "fins"),
        tail,
    );

    let syns_root = epoch(
        epoch_width,
        "eid",
        filter(
            tcp_with_flags(2),
            groupby(filter_groups(vec!["ipv4.dst"]), counter(), "syns", join_left),
        ),
    );
    let fins_root = epoch(
        epoch_width,
        "eid",
        filter(
            tcp_with_flag_mask(1),
            groupby(filter_groups(vec!["ipv4.src"]), counter(), "fins", join_right),
        ),
    );

    (syns_root, fins_root)
}

/// Two streams (`n_conns`, `n_bytes`) joined on `ipv4.dst`, flagging hosts
/// holding open many low-traffic TCP connections. Returns
/// `(n_conns, n_bytes)`.
pub fn slowloris(epoch_width: f64, next: BoxOp) -> (BoxOp, BoxOp) {
    let tail = filter(
        field_le("bytes_per_conn", SLOWLORIS_MAX_BYTES_PER_CONN),
        next,
    );
    let tail = map(divide_ints("bytes_per_conn", "n_bytes", "n_conns"), tail);
    let (join_left, join_right) = join(
        "eid",
        extract_rename("ipv4.dst", "ipv4.dst", "n_conns", "n_conns"),
        extract_rename("ipv4.dst", "ipv4.dst", "n_bytes", "n_bytes"),
        tail,
    );

    let n_conns_root = epoch(
        epoch_width,
        "eid",
        filter(
            is_tcp,
            distinct(
                filter_groups(vec!["ipv4.src", "ipv4.dst", "l4.sport"]),
                groupby(
                    filter_groups(vec!["ipv4.dst"]),
                    counter(),
                    "n_conns",
                    filter(field_ge("n_conns", SLOWLORIS_MIN_CONNS), join_left),
                ),
            ),
        ),
    );
    let n_bytes_root = epoch(
        epoch_width,
        "eid",
        filter(
            is_tcp,
            groupby(
                filter_groups(vec!["ipv4.dst"]),
                sum_ints("ipv4.len"),
                "n_bytes",
                filter(field_ge("n_bytes", SLOWLORIS_MIN_BYTES), join_right),
            ),
        ),
    );

    (n_conns_root, n_bytes_root)
}
