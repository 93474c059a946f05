use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type ProbeId = u64;
pub type Asn = u32;

/// Sentinel RTT for a probe that reported no usable DNS response.
/// Distinct from a genuine `0.0` reading.
pub const NO_RTT_RESULT: f64 = -1.0;

/// One entry of the probe roster.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeRecord {
    pub id: ProbeId,
    pub country_code: Option<String>,
}

/// One DNS result reported by one probe.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DnsSample {
    pub probe_id: ProbeId,
    pub rtt: f64,
}

impl DnsSample {
    pub fn new(probe_id: ProbeId, rtt: f64) -> Self {
        Self { probe_id, rtt }
    }

    pub fn no_result(probe_id: ProbeId) -> Self {
        Self {
            probe_id,
            rtt: NO_RTT_RESULT,
        }
    }

    pub fn rtt_value(&self) -> Option<f64> {
        if self.rtt == NO_RTT_RESULT {
            None
        } else {
            Some(self.rtt)
        }
    }
}

/// The ASNs a probe was connected through on one day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsnSnapshot {
    pub probe_id: ProbeId,
    pub asn_v4: Option<Asn>,
    pub asn_v6: Option<Asn>,
    pub date: NaiveDate,
}

/// A probe-level value tagged with its resolved country, before the
/// per-country grouping. `None` marks an unresolved country.
#[derive(Clone, Debug, PartialEq)]
pub struct CountryAggregate {
    pub country_code: Option<String>,
    pub value: f64,
}
