use crate::probe::{ProbeId, ProbeRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// `probe_id -> two-letter country code`, excluding probes without a country.
pub type CountryLookup = HashMap<ProbeId, String>;

/// The ordered, read-only collection of known probes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProbeRoster {
    probes: Vec<ProbeRecord>,
}

impl ProbeRoster {
    pub fn new(probes: Vec<ProbeRecord>) -> Self {
        Self { probes }
    }

    pub fn probes(&self) -> &[ProbeRecord] {
        &self.probes
    }

    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    pub fn country_lookup(&self) -> CountryLookup {
        self.probes
            .iter()
            .filter_map(|probe| {
                probe
                    .country_code
                    .as_ref()
                    .map(|code| (probe.id, code.clone()))
            })
            .collect()
    }

    /// Ids of the probes registered in `alpha2`, in roster order.
    pub fn probe_ids_in_country(&self, alpha2: &str) -> Vec<ProbeId> {
        self.probes
            .iter()
            .filter(|probe| {
                probe
                    .country_code
                    .as_deref()
                    .is_some_and(|code| code.eq_ignore_ascii_case(alpha2))
            })
            .map(|probe| probe.id)
            .collect()
    }
}
