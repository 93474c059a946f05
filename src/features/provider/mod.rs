mod atlas;
mod client;
mod wire;

pub use atlas::AtlasProvider;
pub use client::{CurlClient, HttpClient};

use crate::probe::{AsnSnapshot, DnsSample, ProbeId, ProbeRecord};
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Http(String),
    #[error("HTTP {code} from {url}")]
    Status { code: u32, url: String },
    #[error("response from {url} exceeded {limit} bytes")]
    TooLarge { url: String, limit: u64 },
    #[error("could not decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

/// Source of raw per-probe measurement results.
///
/// Each call is one atomic success/failure boundary. An empty `Ok` means the
/// provider answered with no data, which callers must not confuse with a
/// failed fetch.
pub trait MeasurementProvider: Send + Sync {
    /// Every DNS result reported by finished DNS measurements started on `date`.
    fn dns_samples(&self, date: NaiveDate) -> Result<Vec<DnsSample>, ProviderError>;

    /// ASN snapshots of `probe_ids` on `date`.
    fn asn_snapshots(
        &self,
        probe_ids: &[ProbeId],
        date: NaiveDate,
    ) -> Result<Vec<AsnSnapshot>, ProviderError>;

    /// Country registration of `probe_ids`.
    fn probe_records(&self, probe_ids: &[ProbeId]) -> Result<Vec<ProbeRecord>, ProviderError>;
}
