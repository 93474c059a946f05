use super::wire::{
    MeasurementSummary, Page, RawDnsResult, RawProbe, RawProbeArchive, decode,
};
use super::{HttpClient, MeasurementProvider, ProviderError};
use crate::common::date::{day_timestamp, format_day};
use crate::config::ProviderConfig;
use crate::probe::{AsnSnapshot, DnsSample, ProbeId, ProbeRecord};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

const MEASUREMENTS_PATH: &str = "api/v2/measurements/";
const PROBES_PATH: &str = "api/v2/probes/";
const PROBE_ARCHIVE_PATH: &str = "api/v2/probes/archive/";
const MEASUREMENT_FIELDS: &str = "id,start_time,stop_time,af,query_argument,query_type,result";

/// Measurement provider speaking the RIPE Atlas v2 REST API.
pub struct AtlasProvider<C> {
    client: C,
    config: ProviderConfig,
}

impl<C: HttpClient> AtlasProvider<C> {
    pub fn new(client: C, config: ProviderConfig) -> Self {
        Self { client, config }
    }

    fn endpoint(&self, path: &str) -> Result<Url, ProviderError> {
        self.config
            .base_url
            .join(path)
            .map_err(|err| ProviderError::Http(format!("invalid endpoint {path}: {err}")))
    }

    fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, ProviderError> {
        let body = self.client.get(url)?;
        decode(url, &body)
    }

    fn collect_pages<T: DeserializeOwned>(&self, first: Url) -> Result<Vec<T>, ProviderError> {
        let mut items = Vec::new();
        let mut next = Some(first);
        while let Some(url) = next.take() {
            let page: Page<T> = self.get_json(&url)?;
            items.extend(page.results);
            if let Some(link) = page.next {
                next = Some(Url::parse(&link).map_err(|err| ProviderError::Decode {
                    url: url.to_string(),
                    message: format!("invalid next link '{link}': {err}"),
                })?);
            }
        }
        Ok(items)
    }

    fn dns_measurement_ids(&self, date: NaiveDate) -> Result<Vec<u64>, ProviderError> {
        let mut url = self.endpoint(MEASUREMENTS_PATH)?;
        url.query_pairs_mut()
            .append_pair("type", "dns")
            .append_pair("status", &self.config.measurement_status.to_string())
            .append_pair("start_time__gte", &day_timestamp(date, 0).to_string())
            .append_pair("start_time__lt", &day_timestamp(date, 1).to_string())
            .append_pair("fields", MEASUREMENT_FIELDS);
        let measurements: Vec<MeasurementSummary> = self.collect_pages(url)?;
        Ok(measurements.into_iter().map(|m| m.id).collect())
    }

    fn measurement_results(&self, measurement_id: u64) -> Result<Vec<DnsSample>, ProviderError> {
        let mut url = self.endpoint(&format!("{MEASUREMENTS_PATH}{measurement_id}/results/"))?;
        url.query_pairs_mut().append_pair("format", "json");
        let raw: Vec<RawDnsResult> = self.get_json(&url)?;
        Ok(raw.into_iter().map(RawDnsResult::into_sample).collect())
    }
}

fn join_ids(ids: &[ProbeId]) -> String {
    ids.iter()
        .map(ProbeId::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

impl<C: HttpClient> MeasurementProvider for AtlasProvider<C> {
    fn dns_samples(&self, date: NaiveDate) -> Result<Vec<DnsSample>, ProviderError> {
        let measurement_ids = self.dns_measurement_ids(date)?;
        let mut samples = Vec::new();
        for measurement_id in &measurement_ids {
            samples.extend(self.measurement_results(*measurement_id)?);
        }
        info!(
            date = %date,
            measurements = measurement_ids.len(),
            samples = samples.len(),
            "fetched dns results"
        );
        Ok(samples)
    }

    fn asn_snapshots(
        &self,
        probe_ids: &[ProbeId],
        date: NaiveDate,
    ) -> Result<Vec<AsnSnapshot>, ProviderError> {
        let mut snapshots = Vec::new();
        for batch in probe_ids.chunks(self.config.batch_size()) {
            let mut url = self.endpoint(PROBE_ARCHIVE_PATH)?;
            url.query_pairs_mut()
                .append_pair("date", &format_day(date))
                .append_pair("probe", &join_ids(batch));
            let raw: Vec<RawProbeArchive> = self.collect_pages(url)?;
            snapshots.extend(raw.into_iter().map(|entry| entry.into_snapshot(date)));
        }
        debug!(date = %date, probes = probe_ids.len(), snapshots = snapshots.len(), "fetched asn snapshots");
        Ok(snapshots)
    }

    fn probe_records(&self, probe_ids: &[ProbeId]) -> Result<Vec<ProbeRecord>, ProviderError> {
        let mut records = Vec::new();
        for batch in probe_ids.chunks(self.config.batch_size()) {
            let mut url = self.endpoint(PROBES_PATH)?;
            url.query_pairs_mut()
                .append_pair("id__in", &join_ids(batch))
                .append_pair("fields", "id,country_code");
            let raw: Vec<RawProbe> = self.collect_pages(url)?;
            records.extend(raw.into_iter().map(ProbeRecord::from));
        }
        Ok(records)
    }
}
