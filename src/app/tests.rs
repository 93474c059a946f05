use super::{AppContext, AppError, run};
use crate::config::GlobalConfig;
use crate::data_model::settings::Request;
use crate::features::country::IsoCountryTable;
use crate::features::range::ComputeError;
use crate::probe::ProbeRecord;
use crate::roster::ProbeRoster;
use crate::features::resolver::ResolveError;
use crate::storage;
use crate::testing::{FakeProvider, day};
use serde_json::{Value, json};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn probe(id: u64, country: Option<&str>) -> ProbeRecord {
    ProbeRecord {
        id,
        country_code: country.map(str::to_string),
    }
}

fn roster() -> ProbeRoster {
    ProbeRoster::new(vec![
        probe(1, Some("US")),
        probe(2, Some("US")),
        probe(3, Some("FR")),
        probe(4, Some("IL")),
        probe(5, Some("IL")),
        probe(6, None),
    ])
}

struct Fixture {
    dir: TempDir,
    ctx: AppContext,
    provider: Arc<FakeProvider>,
}

impl Fixture {
    fn new(provider: FakeProvider) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let roster_path = dir.path().join("roster.json");
        storage::save_roster(&roster_path, &roster()).expect("roster");
        let config = GlobalConfig {
            roster_path: Some(roster_path),
            cache_path: Some(dir.path().join("cache.json")),
            ..GlobalConfig::default()
        };
        let provider = Arc::new(provider);
        let ctx = AppContext::new(
            provider.clone(),
            Arc::new(IsoCountryTable::new()),
            config,
        );
        Self { dir, ctx, provider }
    }

    fn path(&self, name: &str) -> std::path::PathBuf {
        self.dir.path().join(name)
    }

    fn write_cache(&self, json: &str) {
        fs::write(self.path("cache.json"), json).expect("cache");
    }

    fn run(&self, request: Request) -> Result<Value, AppError> {
        let mut out = Vec::new();
        run(&request, &self.ctx, &mut out)?;
        if out.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&out).expect("json output"))
    }
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).expect("read")).expect("json")
}

#[test]
fn dns_day_prints_summary() {
    let fixture = Fixture::new(FakeProvider::default().with_dns(
        "2022-01-01",
        &[(1, 10.0), (2, 20.0), (3, 30.0), (3, -1.0), (99, 5.0)],
    ));

    let output = fixture
        .run(Request::Dns {
            date: day("2022-01-01"),
        })
        .expect("dns");

    assert_eq!(
        output,
        json!({
            "data": {"FRA": 30.0, "USA": 15.0},
            "min": 15.0,
            "max": 30.0,
            "average": 22.5
        })
    );
}

#[test]
fn dns_range_uses_cache_then_provider() {
    let fixture = Fixture::new(
        FakeProvider::default()
            .with_dns("2022-01-02", &[(1, 99.0)])
            .with_dns("2022-01-03", &[(1, 12.0)]),
    );
    fixture.write_cache(
        r#"[{"name": "2022-01-01", "USA": 25.1}, {"name": "2022-01-02", "USA": 24.0}]"#,
    );

    let output = fixture
        .run(Request::DnsRange {
            start: day("2022-01-01"),
            end: day("2022-01-03"),
        })
        .expect("range");

    assert_eq!(
        output,
        json!({"data": [
            {"name": "2022-01-01", "USA": 25.1},
            {"name": "2022-01-02", "USA": 24.0},
            {"name": "2022-01-03", "USA": 12.0}
        ]})
    );
    assert_eq!(
        fixture.provider.dns_calls(),
        vec![day("2022-01-02"), day("2022-01-03")]
    );
}

#[test]
fn dns_range_without_cache_computes_every_day() {
    let fixture = Fixture::new(FakeProvider::default().with_dns("2022-01-01", &[(3, 8.0)]));

    let output = fixture
        .run(Request::DnsRange {
            start: day("2022-01-01"),
            end: day("2022-01-02"),
        })
        .expect("range");

    assert_eq!(
        output,
        json!({"data": [{"name": "2022-01-01", "FRA": 8.0}, {"name": "2022-01-02"}]})
    );
}

#[test]
fn dns_range_surfaces_provider_failure() {
    let fixture = Fixture::new(FakeProvider::default().failing_on("2022-01-03"));
    fixture.write_cache(r#"[{"name": "2022-01-01", "USA": 25.1}, {"name": "2022-01-02", "USA": 24.0}]"#);

    let err = fixture
        .run(Request::DnsRange {
            start: day("2022-01-01"),
            end: day("2022-01-03"),
        })
        .expect_err("failure");

    assert!(matches!(
        err,
        AppError::Resolve(ResolveError::Compute(ComputeError::Provider { date, .. })) if date == day("2022-01-03")
    ));
}

#[test]
fn ipv6_range_reports_daily_share() {
    let fixture = Fixture::new(
        FakeProvider::default()
            .with_asn("2022-01-01", &[(4, Some(100), None), (5, None, Some(200))])
            .with_asn("2022-01-02", &[(4, Some(100), None), (1, None, Some(300))]),
    );

    let output = fixture
        .run(Request::Ipv6 {
            country: "ISR".to_string(),
            start: day("2022-01-01"),
            end: day("2022-01-02"),
        })
        .expect("ipv6");

    assert_eq!(
        output,
        json!({"data": [
            {"name": "2022-01-01", "ip_v6": "50.00"},
            {"name": "2022-01-02", "ip_v6": "0.00"}
        ]})
    );
}

#[test]
fn ipv6_unknown_country_is_rejected() {
    let fixture = Fixture::new(FakeProvider::default());

    let err = fixture
        .run(Request::Ipv6 {
            country: "XXX".to_string(),
            start: day("2022-01-01"),
            end: day("2022-01-01"),
        })
        .expect_err("unknown");

    assert!(matches!(err, AppError::UnknownCountry { code } if code == "XXX"));
}

#[test]
fn snapshot_writes_loadable_cache() {
    let fixture = Fixture::new(
        FakeProvider::default()
            .with_dns("2022-01-01", &[(1, 10.0)])
            .with_dns("2022-01-02", &[(3, 20.0)]),
    );
    let out = fixture.path("snapshots/dns.json");

    let printed = fixture
        .run(Request::Snapshot {
            start: day("2022-01-01"),
            end: day("2022-01-02"),
            out: out.clone(),
        })
        .expect("snapshot");

    assert_eq!(printed, Value::Null);
    let series = storage::load_snapshot(&out).expect("load");
    assert_eq!(series.first_date(), day("2022-01-01"));
    assert_eq!(series.last_date(), day("2022-01-02"));
    assert_eq!(
        read_json(&out),
        json!([{"name": "2022-01-01", "USA": 10.0}, {"name": "2022-01-02", "FRA": 20.0}])
    );
}

#[test]
fn snapshot_fails_when_a_day_cannot_be_fetched() {
    let fixture = Fixture::new(FakeProvider::default().failing_on("2022-01-02"));
    let out = fixture.path("dns.json");

    let err = fixture
        .run(Request::Snapshot {
            start: day("2022-01-01"),
            end: day("2022-01-03"),
            out: out.clone(),
        })
        .expect_err("failure");

    assert!(matches!(
        err,
        AppError::Compute(ComputeError::Provider { date, .. }) if date == day("2022-01-02")
    ));
    assert!(!out.exists());
}

#[test]
fn roster_is_rebuilt_from_seen_probes() {
    let provider = FakeProvider {
        probes: vec![probe(7, Some("DE")), probe(8, None), probe(9, Some("NL"))],
        ..FakeProvider::default()
    }
    .with_dns("2022-01-01", &[(9, 1.0), (7, 2.0), (9, 3.0)]);
    let fixture = Fixture::new(provider);
    let out = fixture.path("new_roster.json");

    fixture
        .run(Request::Roster {
            date: day("2022-01-01"),
            out: out.clone(),
        })
        .expect("roster");

    let roster = storage::load_roster(&out).expect("load");
    assert_eq!(roster.probes(), &[probe(7, Some("DE")), probe(9, Some("NL"))]);
}

#[test]
fn missing_roster_is_a_storage_error() {
    let fixture = Fixture::new(FakeProvider::default());
    fs::remove_file(fixture.path("roster.json")).expect("remove");

    let err = fixture
        .run(Request::Dns {
            date: day("2022-01-01"),
        })
        .expect_err("missing roster");

    assert!(matches!(err, AppError::Storage(_)));
}
