use crate::common::net::parse_base_url;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_PROVIDER_URL: &str = "https://atlas.ripe.net/";
/// Measurement status the provider uses for finished measurements.
pub const STOPPED_STATUS: u8 = 4;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    pub provider: ProviderConfig,
    pub aggregation: AggregationConfig,
    pub roster_path: Option<PathBuf>,
    pub cache_path: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    #[serde(deserialize_with = "deserialize_base_url")]
    pub base_url: Url,
    pub api_key: Option<SecretString>,
    pub timeout_secs: u64,
    pub probe_batch_size: usize,
    pub measurement_status: u8,
    pub max_response_bytes: u64,
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn batch_size(&self) -> usize {
        self.probe_batch_size.max(1)
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_provider_url(),
            api_key: None,
            timeout_secs: 30,
            probe_batch_size: 100,
            measurement_status: STOPPED_STATUS,
            max_response_bytes: 64 * 1024 * 1024,
        }
    }
}

fn default_provider_url() -> Url {
    Url::parse(DEFAULT_PROVIDER_URL).expect("default provider url is valid")
}

/// Config files go through the same normalisation as `--provider-url`, so
/// API paths always join beneath the configured base.
fn deserialize_base_url<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Url, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_base_url(&raw)
        .ok_or_else(|| de::Error::custom(format!("invalid provider base_url '{raw}'")))
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Decimal places kept in per-country RTT averages.
    pub rtt_precision: u32,
    /// Drop probes whose every sample is `NO_RTT_RESULT` instead of counting
    /// them as a `0` average.
    pub skip_silent_probes: bool,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            rtt_precision: 1,
            skip_silent_probes: false,
        }
    }
}

#[derive(Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretString([REDACTED])")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
