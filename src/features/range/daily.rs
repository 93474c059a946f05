use super::ComputeError;
use crate::features::aggregate::{IPV6_METRIC_KEY, MeasurementAggregator};
use crate::features::provider::MeasurementProvider;
use crate::features::series::{DailyMetrics, MetricValue};
use crate::probe::ProbeId;
use crate::roster::CountryLookup;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::warn;

/// Per-country values for a single day.
pub trait DailySource {
    fn metrics_for(&self, date: NaiveDate) -> Result<DailyMetrics, ComputeError>;
}

/// Average DNS RTT per country, keyed by three-letter code.
#[derive(Clone)]
pub struct DnsDaily {
    provider: Arc<dyn MeasurementProvider>,
    aggregator: MeasurementAggregator,
    lookup: Arc<CountryLookup>,
}

impl DnsDaily {
    pub fn new(
        provider: Arc<dyn MeasurementProvider>,
        aggregator: MeasurementAggregator,
        lookup: Arc<CountryLookup>,
    ) -> Self {
        Self {
            provider,
            aggregator,
            lookup,
        }
    }
}

impl DailySource for DnsDaily {
    fn metrics_for(&self, date: NaiveDate) -> Result<DailyMetrics, ComputeError> {
        let samples = self.provider.dns_samples(date).map_err(|source| {
            warn!(date = %date, error = %source, "dns fetch failed");
            ComputeError::Provider { date, source }
        })?;
        Ok(self
            .aggregator
            .dns(&samples, &self.lookup)
            .into_iter()
            .map(|(country, rtt)| (country, MetricValue::Number(rtt)))
            .collect())
    }
}

/// IPv6 ASN share of one country's probes, under [`IPV6_METRIC_KEY`].
#[derive(Clone)]
pub struct Ipv6Daily {
    provider: Arc<dyn MeasurementProvider>,
    aggregator: MeasurementAggregator,
    probe_ids: Vec<ProbeId>,
}

impl Ipv6Daily {
    pub fn new(
        provider: Arc<dyn MeasurementProvider>,
        aggregator: MeasurementAggregator,
        probe_ids: Vec<ProbeId>,
    ) -> Self {
        Self {
            provider,
            aggregator,
            probe_ids,
        }
    }
}

impl DailySource for Ipv6Daily {
    fn metrics_for(&self, date: NaiveDate) -> Result<DailyMetrics, ComputeError> {
        let snapshots = self
            .provider
            .asn_snapshots(&self.probe_ids, date)
            .map_err(|source| {
                warn!(date = %date, error = %source, "asn snapshot fetch failed");
                ComputeError::Provider { date, source }
            })?;
        let share = self.aggregator.ipv6(&snapshots);
        let mut metrics = DailyMetrics::new();
        metrics.insert(IPV6_METRIC_KEY.to_string(), MetricValue::Text(share.formatted()));
        Ok(metrics)
    }
}
