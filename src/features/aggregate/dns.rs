use super::stats::{mean, round_to};
use crate::config::AggregationConfig;
use crate::features::country::CountryCodeConverter;
use crate::probe::{CountryAggregate, DnsSample, NO_RTT_RESULT, ProbeId};
use crate::roster::CountryLookup;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Three-letter country code -> average RTT.
pub type CountryRtt = BTreeMap<String, f64>;

/// Mean of a probe's RTT samples, ignoring `NO_RTT_RESULT`.
///
/// A probe with no usable sample averages to `0.0`.
pub fn probe_average(rtts: &[f64]) -> f64 {
    let usable: Vec<f64> = rtts
        .iter()
        .copied()
        .filter(|rtt| *rtt != NO_RTT_RESULT)
        .collect();
    mean(&usable)
}

pub(super) fn aggregate(
    samples: &[DnsSample],
    lookup: &CountryLookup,
    converter: &dyn CountryCodeConverter,
    options: &AggregationConfig,
) -> CountryRtt {
    let mut by_probe: BTreeMap<ProbeId, Vec<f64>> = BTreeMap::new();
    for sample in samples {
        by_probe.entry(sample.probe_id).or_default().push(sample.rtt);
    }

    let mut silent = 0usize;
    let per_probe: Vec<CountryAggregate> = by_probe
        .into_iter()
        .filter_map(|(probe_id, rtts)| {
            let has_result = rtts.iter().any(|rtt| *rtt != NO_RTT_RESULT);
            if !has_result && options.skip_silent_probes {
                silent += 1;
                return None;
            }
            Some(CountryAggregate {
                country_code: resolve_country(probe_id, lookup, converter),
                value: probe_average(&rtts),
            })
        })
        .collect();

    let mut unresolved = 0usize;
    let mut by_country: HashMap<String, Vec<f64>> = HashMap::new();
    for aggregate in per_probe {
        match aggregate.country_code {
            Some(code) => by_country.entry(code).or_default().push(aggregate.value),
            None => unresolved += 1,
        }
    }

    if silent > 0 || unresolved > 0 {
        debug!(silent, unresolved, "dropped probes from dns aggregation");
    }

    // Average of per-probe averages: every probe weighs the same.
    by_country
        .into_iter()
        .map(|(code, values)| (code, round_to(mean(&values), options.rtt_precision)))
        .collect()
}

fn resolve_country(
    probe_id: ProbeId,
    lookup: &CountryLookup,
    converter: &dyn CountryCodeConverter,
) -> Option<String> {
    let alpha2 = lookup.get(&probe_id)?;
    converter.to_alpha3(alpha2).map(str::to_string)
}
