//! In-memory fakes shared by unit tests.

use crate::common::date::parse_day;
use crate::features::provider::{MeasurementProvider, ProviderError};
use crate::probe::{AsnSnapshot, DnsSample, ProbeId, ProbeRecord};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Mutex;

pub(crate) fn day(input: &str) -> NaiveDate {
    parse_day(input).expect("valid test date")
}

/// Provider answering from fixed per-day tables. Days without an entry
/// return an empty result.
#[derive(Default)]
pub(crate) struct FakeProvider {
    pub dns: HashMap<NaiveDate, Vec<DnsSample>>,
    pub asn: HashMap<NaiveDate, Vec<AsnSnapshot>>,
    pub probes: Vec<ProbeRecord>,
    pub failing_days: Vec<NaiveDate>,
    pub dns_calls: Mutex<Vec<NaiveDate>>,
}

impl FakeProvider {
    pub fn with_dns(mut self, date: &str, samples: &[(ProbeId, f64)]) -> Self {
        self.dns.insert(
            day(date),
            samples
                .iter()
                .map(|(probe_id, rtt)| DnsSample::new(*probe_id, *rtt))
                .collect(),
        );
        self
    }

    pub fn with_asn(mut self, date: &str, entries: &[(ProbeId, Option<u32>, Option<u32>)]) -> Self {
        let date = day(date);
        self.asn.insert(
            date,
            entries
                .iter()
                .map(|(probe_id, asn_v4, asn_v6)| AsnSnapshot {
                    probe_id: *probe_id,
                    asn_v4: *asn_v4,
                    asn_v6: *asn_v6,
                    date,
                })
                .collect(),
        );
        self
    }

    pub fn failing_on(mut self, date: &str) -> Self {
        self.failing_days.push(day(date));
        self
    }

    pub fn dns_calls(&self) -> Vec<NaiveDate> {
        self.dns_calls.lock().expect("calls lock").clone()
    }

    fn check(&self, date: NaiveDate) -> Result<(), ProviderError> {
        if self.failing_days.contains(&date) {
            return Err(ProviderError::Status {
                code: 503,
                url: format!("fake://{date}"),
            });
        }
        Ok(())
    }
}

impl MeasurementProvider for FakeProvider {
    fn dns_samples(&self, date: NaiveDate) -> Result<Vec<DnsSample>, ProviderError> {
        self.dns_calls.lock().expect("calls lock").push(date);
        self.check(date)?;
        Ok(self.dns.get(&date).cloned().unwrap_or_default())
    }

    fn asn_snapshots(
        &self,
        probe_ids: &[ProbeId],
        date: NaiveDate,
    ) -> Result<Vec<AsnSnapshot>, ProviderError> {
        self.check(date)?;
        Ok(self
            .asn
            .get(&date)
            .map(|snapshots| {
                snapshots
                    .iter()
                    .filter(|snapshot| probe_ids.contains(&snapshot.probe_id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn probe_records(&self, probe_ids: &[ProbeId]) -> Result<Vec<ProbeRecord>, ProviderError> {
        Ok(self
            .probes
            .iter()
            .filter(|probe| probe_ids.contains(&probe.id))
            .cloned()
            .collect())
    }
}
