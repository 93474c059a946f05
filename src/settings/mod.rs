use crate::common::date::{DateError, days_before, ensure_ordered, parse_day};
use crate::common::net::parse_base_url;
use crate::common::time::{Clock, SystemClock};
use crate::config::GlobalConfig;
use crate::data_model::settings::{AppSettings, Request};
use crate::logging::LogLevel;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use thiserror::Error;

/// Days before today a range starts at when `--start` is omitted.
const DEFAULT_RANGE_DAYS: u64 = 2;

#[derive(Parser, Debug)]
#[command(name = "geopulse")]
#[command(about = "Per-country DNS latency and IPv6 adoption from probe measurements", long_about = None)]
pub struct CliArgs {
    /// Config file (defaults to <config dir>/geopulse/config.json)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Probe roster file
    #[arg(long, global = true, value_name = "FILE")]
    roster: Option<PathBuf>,

    /// DNS cache snapshot file
    #[arg(long, global = true, value_name = "FILE")]
    cache: Option<PathBuf>,

    /// Measurement API base URL
    #[arg(long, global = true, value_name = "URL")]
    provider_url: Option<String>,

    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Average DNS RTT per country for one day (defaults to yesterday)
    Dns {
        #[arg(long, value_name = "YYYY-MM-DD")]
        date: Option<String>,
    },
    /// Average DNS RTT per country for each day of a range
    DnsRange {
        #[arg(long, value_name = "YYYY-MM-DD")]
        start: Option<String>,
        #[arg(long, value_name = "YYYY-MM-DD")]
        end: Option<String>,
    },
    /// Daily share of IPv6-capable ASNs in one country
    Ipv6 {
        /// Three-letter country code
        #[arg(long, value_name = "ISO3")]
        country: String,
        #[arg(long, value_name = "YYYY-MM-DD")]
        start: Option<String>,
        #[arg(long, value_name = "YYYY-MM-DD")]
        end: Option<String>,
    },
    /// Compute a DNS range and write it as a cache snapshot
    Snapshot {
        #[arg(long, value_name = "YYYY-MM-DD")]
        start: Option<String>,
        #[arg(long, value_name = "YYYY-MM-DD")]
        end: Option<String>,
        #[arg(long, value_name = "FILE")]
        out: PathBuf,
    },
    /// Rebuild the probe roster from the probes seen on one day
    Roster {
        #[arg(long, value_name = "YYYY-MM-DD")]
        date: Option<String>,
        #[arg(long, value_name = "FILE")]
        out: PathBuf,
    },
}

#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error(transparent)]
    InvalidDate(#[from] DateError),
    #[error("invalid provider url '{value}'")]
    InvalidProviderUrl { value: String },
    #[error("country must be a three-letter code (got '{value}')")]
    InvalidCountry { value: String },
}

pub fn load_from_cli() -> Result<AppSettings, SettingsError> {
    let args = CliArgs::parse();
    from_args(args)
}

pub fn from_args(args: CliArgs) -> Result<AppSettings, SettingsError> {
    from_args_with_clock(args, &SystemClock)
}

pub fn from_args_with_clock(
    args: CliArgs,
    clock: &dyn Clock,
) -> Result<AppSettings, SettingsError> {
    let today = clock.today();
    let provider_url = args
        .provider_url
        .map(|value| parse_base_url(&value).ok_or(SettingsError::InvalidProviderUrl { value }))
        .transpose()?;

    let request = match args.command {
        Command::Dns { date } => Request::Dns {
            date: day_or(date.as_deref(), days_before(today, 1))?,
        },
        Command::DnsRange { start, end } => {
            let (start, end) = range_or_default(start.as_deref(), end.as_deref(), today)?;
            Request::DnsRange { start, end }
        }
        Command::Ipv6 {
            country,
            start,
            end,
        } => {
            let country = country.trim();
            if country.len() != 3 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(SettingsError::InvalidCountry {
                    value: country.to_string(),
                });
            }
            let (start, end) = range_or_default(start.as_deref(), end.as_deref(), today)?;
            Request::Ipv6 {
                country: country.to_ascii_uppercase(),
                start,
                end,
            }
        }
        Command::Snapshot { start, end, out } => {
            let (start, end) = range_or_default(start.as_deref(), end.as_deref(), today)?;
            Request::Snapshot { start, end, out }
        }
        Command::Roster { date, out } => Request::Roster {
            date: day_or(date.as_deref(), days_before(today, 1))?,
            out,
        },
    };

    Ok(AppSettings {
        config_path: args.config,
        roster_path: args.roster,
        cache_path: args.cache,
        provider_url,
        log_level: args.log_level,
        request,
    })
}

fn day_or(input: Option<&str>, fallback: NaiveDate) -> Result<NaiveDate, DateError> {
    input.map_or(Ok(fallback), parse_day)
}

fn range_or_default(
    start: Option<&str>,
    end: Option<&str>,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate), DateError> {
    let start = day_or(start, days_before(today, DEFAULT_RANGE_DAYS))?;
    let end = day_or(end, today)?;
    ensure_ordered(start, end)?;
    Ok((start, end))
}

/// Lets command-line paths and URL override the loaded config.
pub fn apply_global(settings: &AppSettings, global: &mut GlobalConfig) {
    if let Some(url) = &settings.provider_url {
        global.provider.base_url = url.clone();
    }
    if let Some(path) = &settings.roster_path {
        global.roster_path = Some(path.clone());
    }
    if let Some(path) = &settings.cache_path {
        global.cache_path = Some(path.clone());
    }
}
