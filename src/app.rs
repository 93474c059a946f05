use crate::config::GlobalConfig;
use crate::data_model::settings::Request;
use crate::features::aggregate::MeasurementAggregator;
use crate::features::country::{CountryCodeConverter, IsoCountryTable};
use crate::features::provider::{AtlasProvider, CurlClient, MeasurementProvider, ProviderError};
use crate::features::range::{ComputeError, DnsDaily, Ipv6Daily, RangeComputer, RangeSource};
use crate::features::resolver::{FragmentedRangeResolver, ResolveError};
use crate::features::series::{DailyRecord, DailySeries, SeriesError};
use crate::presentation::{CountrySummary, DataEnvelope};
use crate::probe::ProbeId;
use crate::roster::ProbeRoster;
use crate::storage::{self, StorageError};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Compute(#[from] ComputeError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("computed records do not form a daily series: {0}")]
    Series(#[from] SeriesError),
    #[error("unknown country code '{code}'")]
    UnknownCountry { code: String },
    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

/// Everything a request needs: the measurement source, the aggregation
/// rules and the loaded config.
pub struct AppContext {
    provider: Arc<dyn MeasurementProvider>,
    aggregator: MeasurementAggregator,
    config: GlobalConfig,
}

impl AppContext {
    pub fn new(
        provider: Arc<dyn MeasurementProvider>,
        converter: Arc<dyn CountryCodeConverter>,
        config: GlobalConfig,
    ) -> Self {
        let aggregator = MeasurementAggregator::new(converter, config.aggregation);
        Self {
            provider,
            aggregator,
            config,
        }
    }

    /// Context backed by the HTTP provider and the built-in country table.
    pub fn from_config(config: GlobalConfig) -> Self {
        let client = CurlClient::new(&config.provider);
        let provider = AtlasProvider::new(client, config.provider.clone());
        Self::new(
            Arc::new(provider),
            Arc::new(IsoCountryTable::new()),
            config,
        )
    }

    pub fn config(&self) -> &GlobalConfig {
        &self.config
    }

    fn roster_path(&self) -> Result<PathBuf, StorageError> {
        match &self.config.roster_path {
            Some(path) => Ok(path.clone()),
            None => storage::default_roster_path(),
        }
    }

    fn cache_path(&self) -> Result<PathBuf, StorageError> {
        match &self.config.cache_path {
            Some(path) => Ok(path.clone()),
            None => storage::default_cache_path(),
        }
    }

    fn roster(&self) -> Result<ProbeRoster, StorageError> {
        storage::load_roster(&self.roster_path()?)
    }

    fn dns_computer(&self, roster: &ProbeRoster) -> RangeComputer<DnsDaily> {
        RangeComputer::new(DnsDaily::new(
            Arc::clone(&self.provider),
            self.aggregator.clone(),
            Arc::new(roster.country_lookup()),
        ))
    }
}

/// Executes one request, writing its JSON result to `out`.
pub fn run(request: &Request, ctx: &AppContext, out: &mut impl Write) -> Result<(), AppError> {
    match request {
        Request::Dns { date } => {
            let summary = dns_day(ctx, *date)?;
            write_json(out, &summary)
        }
        Request::DnsRange { start, end } => {
            let records = dns_range(ctx, *start, *end)?;
            write_json(out, &DataEnvelope::new(records))
        }
        Request::Ipv6 {
            country,
            start,
            end,
        } => {
            let records = ipv6_range(ctx, country, *start, *end)?;
            write_json(out, &DataEnvelope::new(records))
        }
        Request::Snapshot { start, end, out: path } => {
            let series = snapshot(ctx, *start, *end, path)?;
            info!(
                path = %path.display(),
                days = series.len(),
                "snapshot written"
            );
            Ok(())
        }
        Request::Roster { date, out: path } => {
            let roster = rebuild_roster(ctx, *date, path)?;
            info!(path = %path.display(), probes = roster.len(), "roster written");
            Ok(())
        }
    }
}

fn dns_day(ctx: &AppContext, date: NaiveDate) -> Result<CountrySummary, AppError> {
    let roster = ctx.roster()?;
    let samples = ctx.provider.dns_samples(date)?;
    let values = ctx.aggregator.dns(&samples, &roster.country_lookup());
    Ok(CountrySummary::from_values(values))
}

fn dns_range(
    ctx: &AppContext,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<DailyRecord>, AppError> {
    let roster = ctx.roster()?;
    let computer = ctx.dns_computer(&roster);
    let cache_path = ctx.cache_path()?;
    if !cache_path.exists() {
        warn!(path = %cache_path.display(), "no cache snapshot, computing every day");
        return Ok(computer.compute(start, end)?);
    }
    let cache = storage::load_snapshot(&cache_path)?;
    Ok(FragmentedRangeResolver::new(&cache, &computer).resolve(start, end)?)
}

fn ipv6_range(
    ctx: &AppContext,
    country: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<DailyRecord>, AppError> {
    let alpha2 = ctx
        .aggregator
        .converter()
        .to_alpha2(country)
        .ok_or_else(|| AppError::UnknownCountry {
            code: country.to_string(),
        })?;
    let roster = ctx.roster()?;
    let probe_ids = roster.probe_ids_in_country(alpha2);
    if probe_ids.is_empty() {
        warn!(country, "no roster probes in country");
    }
    let computer = RangeComputer::new(Ipv6Daily::new(
        Arc::clone(&ctx.provider),
        ctx.aggregator.clone(),
        probe_ids,
    ));
    Ok(computer.compute(start, end)?)
}

fn snapshot(
    ctx: &AppContext,
    start: NaiveDate,
    end: NaiveDate,
    path: &Path,
) -> Result<DailySeries, AppError> {
    let roster = ctx.roster()?;
    let records = ctx.dns_computer(&roster).compute(start, end)?;
    let series = DailySeries::new(records)?;
    storage::save_snapshot(path, &series)?;
    Ok(series)
}

fn rebuild_roster(ctx: &AppContext, date: NaiveDate, path: &Path) -> Result<ProbeRoster, AppError> {
    let samples = ctx.provider.dns_samples(date)?;
    let probe_ids: Vec<ProbeId> = samples
        .iter()
        .map(|sample| sample.probe_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let roster = ProbeRoster::new(ctx.provider.probe_records(&probe_ids)?);
    storage::save_roster(path, &roster)?;
    Ok(roster)
}

fn write_json<T: Serialize>(out: &mut impl Write, value: &T) -> Result<(), AppError> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests;
