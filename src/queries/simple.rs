//! The eleven single-stream queries from spec.md §4.7's table.

use crate::operator::BoxOp;
use crate::operators::{counter, distinct, epoch, filter, groupby, map, single_group};
use crate::operators::groupby::filter_groups;
use crate::queries::config::Config;
use crate::queries::support::{field_ge, tcp_to_port, tcp_with_flags};

/// `map(drop eth.src, eth.dst)` -- the identity query, minus the two MAC
/// fields a privacy-conscious consumer shouldn't see.
pub fn ident(next: BoxOp) -> BoxOp {
    map(|r| Ok(r.without(&["eth.src", "eth.dst"])), next)
}

/// `groupby(single, counter, pkts)`, the part of [`count_pkts`] below the
/// epoch wrapper -- exposed so a time-less, pre-windowed source (Walt's CSV,
/// whose records already carry a reset-driven `eid`) can drive it directly.
pub fn count_pkts_body(next: BoxOp) -> BoxOp {
    groupby(single_group(), counter(), "pkts", next)
}

/// `epoch(1s, eid) -> groupby(single, counter, pkts)`.
pub fn count_pkts(epoch_width: f64, next: BoxOp) -> BoxOp {
    epoch(epoch_width, "eid", count_pkts_body(next))
}

/// `groupby({src,dst}, counter, pkts)`, the body of [`pkts_per_src_dst`].
pub fn pkts_per_src_dst_body(next: BoxOp) -> BoxOp {
    groupby(
        filter_groups(vec!["ipv4.src", "ipv4.dst"]),
        counter(),
        "pkts",
        next,
    )
}

/// `epoch(1s, eid) -> groupby({src,dst}, counter, pkts)`.
pub fn pkts_per_src_dst(epoch_width: f64, next: BoxOp) -> BoxOp {
    epoch(epoch_width, "eid", pkts_per_src_dst_body(next))
}

/// `distinct({src}) -> groupby(single, counter, srcs)`, the body of
/// [`distinct_srcs`].
pub fn distinct_srcs_body(next: BoxOp) -> BoxOp {
    distinct(
        filter_groups(vec!["ipv4.src"]),
        groupby(single_group(), counter(), "srcs", next),
    )
}

/// `epoch(1s, eid) -> distinct({src}) -> groupby(single, counter, srcs)`.
pub fn distinct_srcs(epoch_width: f64, next: BoxOp) -> BoxOp {
    epoch(epoch_width, "eid", distinct_srcs_body(next))
}

/// `filter(proto=6 & flags=2) -> groupby({dst}, counter, cons) ->
/// filter(cons >= T)`, the body of [`tcp_new_cons`].
pub fn tcp_new_cons_body(threshold: i64, next: BoxOp) -> BoxOp {
    let tail = filter(field_ge("cons", threshold), next);
    let grouped = groupby(filter_groups(vec!["ipv4.dst"]), counter(), "cons", tail);
    filter(tcp_with_flags(2), grouped)
}

/// `epoch(1s) -> filter(proto=6 & flags=2) -> groupby({dst}, counter, cons)
/// -> filter(cons >= T)`: new TCP connection attempts (SYN-only packets)
/// per destination.
pub fn tcp_new_cons(config: Config, next: BoxOp) -> BoxOp {
    epoch(
        config.epoch_width,
        "eid",
        tcp_new_cons_body(config.threshold, next),
    )
}

/// `filter(proto=6 & dport=22) -> distinct({src,dst,len}) ->
/// groupby({dst,len}, counter, srcs) -> filter(srcs >= T)`, the body of
/// [`ssh_brute_force`].
pub fn ssh_brute_force_body(threshold: i64, next: BoxOp) -> BoxOp {
    let tail = filter(field_ge("srcs", threshold), next);
    let grouped = groupby(
        filter_groups(vec!["ipv4.dst", "ipv4.len"]),
        counter(),
        "srcs",
        tail,
    );
    let distinctd = distinct(
        filter_groups(vec!["ipv4.src", "ipv4.dst", "ipv4.len"]),
        grouped,
    );
    filter(tcp_to_port(22), distinctd)
}

/// `epoch(1s) -> filter(proto=6 & dport=22) -> distinct({src,dst,len}) ->
/// groupby({dst,len}, counter, srcs) -> filter(srcs >= T)`.
pub fn ssh_brute_force(config: Config, next: BoxOp) -> BoxOp {
    epoch(
        config.epoch_width,
        "eid",
        ssh_brute_force_body(config.threshold, next),
    )
}

/// `distinct({src,dst}) -> groupby({src}, counter, dsts) ->
/// filter(dsts >= T)`, the body of [`super_spreader`].
pub fn super_spreader_body(threshold: i64, next: BoxOp) -> BoxOp {
    let tail = filter(field_ge("dsts", threshold), next);
    let grouped = groupby(filter_groups(vec!["ipv4.src"]), counter(), "dsts", tail);
    distinct(filter_groups(vec!["ipv4.src", "ipv4.dst"]), grouped)
}

/// `epoch(1s) -> distinct({src,dst}) -> groupby({src}, counter, dsts) ->
/// filter(dsts >= T)`: hosts that contact an unusually large number of
/// distinct destinations.
pub fn super_spreader(config: Config, next: BoxOp) -> BoxOp {
    epoch(
        config.epoch_width,
        "eid",
        super_spreader_body(config.threshold, next),
    )
}

/// `distinct({src,dport}) -> groupby({src}, counter, ports) ->
/// filter(ports >= T)`, the body of [`port_scan`].
pub fn port_scan_body(threshold: i64, next: BoxOp) -> BoxOp {
    let tail = filter(field_ge("ports", threshold), next);
    let grouped = groupby(filter_groups(vec!["ipv4.src"]), counter(), "ports", tail);
    distinct(filter_groups(vec!["ipv4.src", "l4.dport"]), grouped)
}

/// `epoch(1s) -> distinct({src,dport}) -> groupby({src}, counter, ports) ->
/// filter(ports >= T)`: hosts probing an unusually large number of distinct
/// destination ports.
pub fn port_scan(config: Config, next: BoxOp) -> BoxOp {
    epoch(
        config.epoch_width,
        "eid",
        port_scan_body(config.threshold, next),
    )
}

/// `distinct({src,dst}) -> groupby({dst}, counter, srcs) ->
/// filter(srcs >= T)`, the body of [`ddos`].
pub fn ddos_body(threshold: i64, next: BoxOp) -> BoxOp {
    let tail = filter(field_ge("srcs", threshold), next);
    let grouped = groupby(filter_groups(vec!["ipv4.dst"]), counter(), "srcs", tail);
    distinct(filter_groups(vec!["ipv4.src", "ipv4.dst"]), grouped)
}

/// `epoch(1s) -> distinct({src,dst}) -> groupby({dst}, counter, srcs) ->
/// filter(srcs >= T)`: destinations contacted by an unusually large number
/// of distinct sources.
pub fn ddos(config: Config, next: BoxOp) -> BoxOp {
    epoch(config.epoch_width, "eid", ddos_body(config.threshold, next))
}

/// `distinct({src,dst})`, the body of [`q3`].
pub fn q3_body(next: BoxOp) -> BoxOp {
    distinct(filter_groups(vec!["ipv4.src", "ipv4.dst"]), next)
}

/// `epoch(100s) -> distinct({src,dst})`.
pub fn q3(epoch_width: f64, next: BoxOp) -> BoxOp {
    epoch(epoch_width, "eid", q3_body(next))
}

/// `groupby({dst}, counter, pkts)`, the body of [`q4`].
pub fn q4_body(next: BoxOp) -> BoxOp {
    groupby(filter_groups(vec!["ipv4.dst"]), counter(), "pkts", next)
}

/// `epoch(10000s) -> groupby({dst}, counter, pkts)`.
pub fn q4(epoch_width: f64, next: BoxOp) -> BoxOp {
    epoch(epoch_width, "eid", q4_body(next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::Operator;
    use crate::record::Record;
    use crate::value::Value;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder(Rc<RefCell<Vec<Record>>>);
    impl Operator for Recorder {
        fn next(&mut self, record: &Record) -> Result<(), crate::error::QueryError> {
            self.0.borrow_mut().push(record.clone());
            Ok(())
        }
        fn reset(&mut self, _record: &Record) -> Result<(), crate::error::QueryError> {
            Ok(())
        }
    }

    #[test]
    fn ident_drops_mac_fields() {
        let out = Rc::new(RefCell::new(Vec::new()));
        let mut op = ident(Box::new(Recorder(out.clone())));
        op.next(
            &Record::new()
                .with("eth.src", Value::Mac([0; 6]))
                .with("eth.dst", Value::Mac([1; 6]))
                .with("ipv4.len", Value::Int(40)),
        )
        .unwrap();
        let out = out.borrow();
        assert!(out[0].get("eth.src").is_none());
        assert!(out[0].get("eth.dst").is_none());
        assert_eq!(out[0].get("ipv4.len"), Some(&Value::Int(40)));
    }

    #[test]
    fn tcp_new_cons_forty_one_records_crosses_threshold() {
        let out = Rc::new(RefCell::new(Vec::new()));
        let mut op = tcp_new_cons(Config::new(1.0, 40), Box::new(Recorder(out.clone())));
        for _ in 0..41 {
            op.next(
                &Record::new()
                    .with("time", Value::float(0.1))
                    .with("ipv4.proto", Value::Int(6))
                    .with("l4.flags", Value::Int(2))
                    .with("ipv4.dst", Value::ipv4_or_zero("10.0.0.1").unwrap()),
            )
            .unwrap();
        }
        // force epoch rollover
        op.next(
            &Record::new()
                .with("time", Value::float(2.0))
                .with("ipv4.proto", Value::Int(6))
                .with("l4.flags", Value::Int(2))
                .with("ipv4.dst", Value::ipv4_or_zero("10.0.0.1").unwrap()),
        )
        .unwrap();

        let out = out.borrow();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].get("cons"), Some(&Value::Int(41)));
        assert_eq!(out[0].get("eid"), Some(&Value::Int(0)));
    }

    #[test]
    fn tcp_new_cons_forty_records_stays_below_threshold() {
        let out = Rc::new(RefCell::new(Vec::new()));
        let mut op = tcp_new_cons(Config::new(1.0, 40), Box::new(Recorder(out.clone())));
        for _ in 0..40 {
            op.next(
                &Record::new()
                    .with("time", Value::float(0.1))
                    .with("ipv4.proto", Value::Int(6))
                    .with("l4.flags", Value::Int(2))
                    .with("ipv4.dst", Value::ipv4_or_zero("10.0.0.1").unwrap()),
            )
            .unwrap();
        }
        op.next(
            &Record::new()
                .with("time", Value::float(2.0))
                .with("ipv4.proto", Value::Int(6))
                .with("l4.flags", Value::Int(2))
                .with("ipv4.dst", Value::ipv4_or_zero("10.0.0.1").unwrap()),
        )
        .unwrap();
        assert_eq!(out.borrow().len(), 0);
    }
}
