use crate::logging::LogLevel;
use chrono::NaiveDate;
use std::path::PathBuf;
use url::Url;

/// Validated command line.
#[derive(Debug, Clone, PartialEq)]
pub struct AppSettings {
    pub config_path: Option<PathBuf>,
    pub roster_path: Option<PathBuf>,
    pub cache_path: Option<PathBuf>,
    pub provider_url: Option<Url>,
    pub log_level: LogLevel,
    pub request: Request,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Per-country DNS RTT for one day.
    Dns { date: NaiveDate },
    /// Per-country DNS RTT per day, served from the cache where possible.
    DnsRange { start: NaiveDate, end: NaiveDate },
    /// Daily IPv6 share for one country, by three-letter code.
    Ipv6 {
        country: String,
        start: NaiveDate,
        end: NaiveDate,
    },
    Snapshot {
        start: NaiveDate,
        end: NaiveDate,
        out: PathBuf,
    },
    Roster { date: NaiveDate, out: PathBuf },
}
