use super::{ComputeError, DnsDaily, Ipv6Daily, RangeComputer, RangeSource};
use crate::config::AggregationConfig;
use crate::features::aggregate::MeasurementAggregator;
use crate::features::country::IsoCountryTable;
use crate::features::provider::ProviderError;
use crate::features::series::{DailyRecord, MetricValue, check_contiguous};
use crate::probe::AsnSnapshot;
use crate::roster::CountryLookup;
use crate::testing::{FakeProvider, day};
use std::sync::Arc;

fn aggregator() -> MeasurementAggregator {
    MeasurementAggregator::new(Arc::new(IsoCountryTable::new()), AggregationConfig::default())
}

fn dns_computer(provider: Arc<FakeProvider>) -> RangeComputer<DnsDaily> {
    let lookup: CountryLookup = [(1, "US".to_string()), (2, "FR".to_string())].into();
    RangeComputer::new(DnsDaily::new(provider, aggregator(), Arc::new(lookup)))
}

#[test]
fn one_record_per_day_in_order() {
    let provider = Arc::new(
        FakeProvider::default()
            .with_dns("2021-12-31", &[(1, 10.0), (2, 30.0)])
            .with_dns("2022-01-02", &[(1, 12.0)]),
    );
    let computer = dns_computer(provider.clone());

    let records = computer
        .compute(day("2021-12-30"), day("2022-01-02"))
        .expect("records");

    assert_eq!(records.len(), 4);
    assert_eq!(records[0].date, day("2021-12-30"));
    assert_eq!(records[3].date, day("2022-01-02"));
    assert!(check_contiguous(&records).is_ok());
    assert_eq!(provider.dns_calls().len(), 4);

    assert!(records[0].metrics.is_empty());
    assert_eq!(records[1].metrics.get("USA"), Some(&MetricValue::Number(10.0)));
    assert_eq!(records[1].metrics.get("FRA"), Some(&MetricValue::Number(30.0)));
    assert_eq!(records[3].metrics.len(), 1);
}

#[test]
fn single_day_range() {
    let provider = Arc::new(FakeProvider::default().with_dns("2022-01-01", &[(2, 5.0)]));
    let records = dns_computer(provider)
        .compute(day("2022-01-01"), day("2022-01-01"))
        .expect("records");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].metrics.get("FRA"), Some(&MetricValue::Number(5.0)));
}

#[test]
fn provider_failure_names_the_day() {
    let provider = Arc::new(FakeProvider::default().failing_on("2022-01-02"));
    let err = dns_computer(provider)
        .compute(day("2022-01-01"), day("2022-01-03"))
        .expect_err("should fail");

    match err {
        ComputeError::Provider { date, source } => {
            assert_eq!(date, day("2022-01-02"));
            assert!(matches!(source, ProviderError::Status { code: 503, .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn inverted_range_is_rejected() {
    let provider = Arc::new(FakeProvider::default());
    let err = dns_computer(provider.clone())
        .compute(day("2022-01-03"), day("2022-01-01"))
        .expect_err("should fail");
    assert!(matches!(err, ComputeError::InvertedRange { .. }));
    assert!(provider.dns_calls().is_empty());
}

#[test]
fn ipv6_share_per_day() {
    let provider = Arc::new(
        FakeProvider::default()
            .with_asn("2022-01-01", &[(1, Some(10), None), (2, Some(20), None), (3, None, Some(30)), (4, Some(40), Some(40))])
            .with_asn("2022-01-02", &[(1, Some(10), None), (9, None, Some(99))]),
    );
    let computer = RangeComputer::new(Ipv6Daily::new(provider, aggregator(), vec![1, 2, 3, 4]));

    let records = computer
        .compute(day("2022-01-01"), day("2022-01-03"))
        .expect("records");
    let shares: Vec<Option<&MetricValue>> =
        records.iter().map(|record| record.metrics.get("ip_v6")).collect();

    assert_eq!(
        shares,
        vec![
            Some(&MetricValue::Text("50.00".to_string())),
            Some(&MetricValue::Text("0.00".to_string())),
            Some(&MetricValue::Text("0.00".to_string())),
        ]
    );
    assert_eq!(
        serde_json::to_value(&records[0]).expect("json"),
        serde_json::json!({"name": "2022-01-01", "ip_v6": "50.00"})
    );
}

#[test]
fn ipv6_counts_every_snapshot_the_provider_returns_for_the_day() {
    // The archive answer for a day may carry the snapshot's own timestamp.
    let mut provider = FakeProvider::default();
    provider.asn.insert(
        day("2022-01-01"),
        vec![
            AsnSnapshot {
                probe_id: 1,
                asn_v4: Some(10),
                asn_v6: None,
                date: day("2021-12-31"),
            },
            AsnSnapshot {
                probe_id: 2,
                asn_v4: None,
                asn_v6: Some(20),
                date: day("2022-01-01"),
            },
        ],
    );
    let computer = RangeComputer::new(Ipv6Daily::new(Arc::new(provider), aggregator(), vec![1, 2]));

    let records = computer
        .compute(day("2022-01-01"), day("2022-01-01"))
        .expect("records");

    assert_eq!(
        records[0].metrics.get("ip_v6"),
        Some(&MetricValue::Text("50.00".to_string()))
    );
}

#[test]
fn closures_are_range_sources() {
    let source = |start, end| -> Result<Vec<DailyRecord>, ComputeError> {
        Ok(crate::common::date::date_range(start, end)
            .into_iter()
            .map(|date| DailyRecord::new(date, Default::default()))
            .collect())
    };
    let records = source
        .compute(day("2022-01-01"), day("2022-01-05"))
        .expect("records");
    assert_eq!(records.len(), 5);
}
