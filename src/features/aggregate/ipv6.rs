use super::stats::format_percentage;
use crate::probe::{Asn, AsnSnapshot};
use serde::Serialize;
use std::collections::HashSet;

/// Metric key under which the daily IPv6 share is stored.
pub const IPV6_METRIC_KEY: &str = "ip_v6";

/// Distinct ASNs per address family, in first-seen order.
///
/// A snapshot with an IPv6 ASN counts only toward `v6`; its IPv4 ASN is
/// ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DistinctAsns {
    pub v4: Vec<Asn>,
    pub v6: Vec<Asn>,
}

impl DistinctAsns {
    pub fn from_snapshots(snapshots: &[AsnSnapshot]) -> Self {
        let mut distinct = Self::default();
        for snapshot in snapshots {
            match (snapshot.asn_v6, snapshot.asn_v4) {
                (Some(v6), _) => push_unique(&mut distinct.v6, v6),
                (None, Some(v4)) => push_unique(&mut distinct.v4, v4),
                (None, None) => {}
            }
        }
        distinct
    }

    pub fn amounts(&self) -> AsnAmounts {
        let union: HashSet<Asn> = self.v4.iter().chain(&self.v6).copied().collect();
        AsnAmounts {
            asn_amount: union.len(),
            asn_v4_amount: self.v4.len(),
            asn_v6_amount: self.v6.len(),
        }
    }
}

fn push_unique(list: &mut Vec<Asn>, asn: Asn) {
    if !list.contains(&asn) {
        list.push(asn);
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AsnAmounts {
    pub asn_amount: usize,
    pub asn_v4_amount: usize,
    pub asn_v6_amount: usize,
}

impl AsnAmounts {
    /// `v6 / (v4 + v6) * 100`, or `0.0` when no ASN was observed.
    pub fn ipv6_percentage(&self) -> f64 {
        let total = self.asn_v4_amount + self.asn_v6_amount;
        if total == 0 {
            return 0.0;
        }
        self.asn_v6_amount as f64 / total as f64 * 100.0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Ipv6Share {
    pub amounts: AsnAmounts,
    pub percentage: f64,
}

impl Ipv6Share {
    pub fn from_snapshots(snapshots: &[AsnSnapshot]) -> Self {
        let amounts = DistinctAsns::from_snapshots(snapshots).amounts();
        Self {
            amounts,
            percentage: amounts.ipv6_percentage(),
        }
    }

    pub fn formatted(&self) -> String {
        format_percentage(self.percentage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::date::parse_day;

    fn snapshot(probe_id: u64, asn_v4: Option<Asn>, asn_v6: Option<Asn>) -> AsnSnapshot {
        AsnSnapshot {
            probe_id,
            asn_v4,
            asn_v6,
            date: parse_day("2022-01-01").expect("date"),
        }
    }

    #[test]
    fn half_of_distinct_asns_on_ipv6() {
        let snapshots = vec![
            snapshot(1, Some(100), None),
            snapshot(2, Some(200), None),
            snapshot(3, Some(300), Some(300)),
            snapshot(4, None, Some(400)),
        ];
        assert_eq!(Ipv6Share::from_snapshots(&snapshots).formatted(), "50.00");
    }

    #[test]
    fn no_asns_is_zero_percent() {
        let share = Ipv6Share::from_snapshots(&[]);
        assert_eq!(share.formatted(), "0.00");
        assert_eq!(share.amounts, AsnAmounts::default());
    }

    #[test]
    fn probes_on_the_same_asn_count_once() {
        let snapshots = vec![
            snapshot(1, Some(100), None),
            snapshot(2, Some(100), None),
            snapshot(3, None, Some(900)),
            snapshot(4, Some(100), Some(900)),
            snapshot(5, None, Some(901)),
        ];
        let distinct = DistinctAsns::from_snapshots(&snapshots);
        assert_eq!(distinct.v4, vec![100]);
        assert_eq!(distinct.v6, vec![900, 901]);
        assert_eq!(Ipv6Share::from_snapshots(&snapshots).formatted(), "66.67");
    }

    #[test]
    fn only_ipv4_or_only_ipv6() {
        let v4_only = vec![snapshot(1, Some(1), None), snapshot(2, Some(2), None)];
        assert_eq!(Ipv6Share::from_snapshots(&v4_only).formatted(), "0.00");

        let v6_only = vec![snapshot(1, None, Some(1)), snapshot(2, Some(9), Some(2))];
        assert_eq!(Ipv6Share::from_snapshots(&v6_only).formatted(), "100.00");
    }

    #[test]
    fn amounts_count_union_of_families() {
        let distinct = DistinctAsns {
            v4: vec![1, 2, 3],
            v6: vec![1, 4, 5],
        };
        assert_eq!(
            distinct.amounts(),
            AsnAmounts {
                asn_amount: 5,
                asn_v4_amount: 3,
                asn_v6_amount: 3,
            }
        );
    }

    #[test]
    fn snapshots_without_any_asn_are_ignored() {
        let snapshots = vec![snapshot(1, None, None), snapshot(2, Some(7), None)];
        let distinct = DistinctAsns::from_snapshots(&snapshots);
        assert_eq!(distinct.v4, vec![7]);
        assert!(distinct.v6.is_empty());
    }
}
