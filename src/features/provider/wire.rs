//! Response shapes of the measurement provider's REST API.

use super::ProviderError;
use crate::probe::{Asn, AsnSnapshot, DnsSample, ProbeId, ProbeRecord};
use chrono::NaiveDate;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

#[derive(Debug, Deserialize)]
pub(super) struct Page<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct MeasurementSummary {
    pub id: u64,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawDnsResult {
    pub prb_id: ProbeId,
    #[serde(default)]
    pub result: Option<RawDnsResponse>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawDnsResponse {
    #[serde(default)]
    pub rt: Option<f64>,
}

impl RawDnsResult {
    /// Results without a response time become `NO_RTT_RESULT`.
    pub fn into_sample(self) -> DnsSample {
        match self.result.and_then(|response| response.rt) {
            Some(rt) => DnsSample::new(self.prb_id, rt),
            None => DnsSample::no_result(self.prb_id),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct RawProbe {
    pub id: ProbeId,
    #[serde(default)]
    pub country_code: Option<String>,
}

impl From<RawProbe> for ProbeRecord {
    fn from(raw: RawProbe) -> Self {
        ProbeRecord {
            id: raw.id,
            country_code: raw.country_code.filter(|code| !code.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct RawProbeArchive {
    pub id: ProbeId,
    #[serde(default)]
    pub asn_v4: Option<Asn>,
    #[serde(default)]
    pub asn_v6: Option<Asn>,
}

impl RawProbeArchive {
    pub fn into_snapshot(self, date: NaiveDate) -> AsnSnapshot {
        AsnSnapshot {
            probe_id: self.id,
            asn_v4: self.asn_v4,
            asn_v6: self.asn_v6,
            date,
        }
    }
}

pub(super) fn decode<T: DeserializeOwned>(url: &Url, body: &[u8]) -> Result<T, ProviderError> {
    serde_json::from_slice(body).map_err(|err| ProviderError::Decode {
        url: url.to_string(),
        message: err.to_string(),
    })
}
