mod dns;
mod ipv6;
mod stats;

pub use dns::{CountryRtt, probe_average};
pub use ipv6::{AsnAmounts, DistinctAsns, IPV6_METRIC_KEY, Ipv6Share};

use crate::config::AggregationConfig;
use crate::features::country::CountryCodeConverter;
use crate::probe::{AsnSnapshot, DnsSample};
use crate::roster::CountryLookup;
use std::sync::Arc;

/// Reduces one day of raw probe samples to per-country values.
///
/// Pure over its inputs: the country table and options are injected, the
/// samples and the probe lookup are passed per call.
#[derive(Clone)]
pub struct MeasurementAggregator {
    converter: Arc<dyn CountryCodeConverter>,
    options: AggregationConfig,
}

impl MeasurementAggregator {
    pub fn new(converter: Arc<dyn CountryCodeConverter>, options: AggregationConfig) -> Self {
        Self { converter, options }
    }

    pub fn converter(&self) -> &dyn CountryCodeConverter {
        self.converter.as_ref()
    }

    /// Average DNS RTT per three-letter country code.
    pub fn dns(&self, samples: &[DnsSample], lookup: &CountryLookup) -> CountryRtt {
        dns::aggregate(samples, lookup, self.converter.as_ref(), &self.options)
    }

    /// Share of distinct IPv6-capable ASNs among one country's snapshots.
    pub fn ipv6(&self, snapshots: &[AsnSnapshot]) -> Ipv6Share {
        Ipv6Share::from_snapshots(snapshots)
    }
}
