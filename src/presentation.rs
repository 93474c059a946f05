//! Output shapes for the JSON the binary prints.

use crate::features::aggregate::CountryRtt;
use serde::Serialize;

/// One day of per-country values with summary statistics over them.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CountrySummary {
    pub data: CountryRtt,
    pub min: f64,
    pub max: f64,
    pub average: f64,
}

impl CountrySummary {
    /// Empty input yields `0` for every statistic.
    pub fn from_values(data: CountryRtt) -> Self {
        if data.is_empty() {
            return Self {
                data,
                min: 0.0,
                max: 0.0,
                average: 0.0,
            };
        }
        let min = data.values().copied().fold(f64::INFINITY, f64::min);
        let max = data.values().copied().fold(f64::NEG_INFINITY, f64::max);
        let average = data.values().sum::<f64>() / data.len() as f64;
        Self {
            data,
            min,
            max,
            average,
        }
    }
}

/// `{"data": ...}` wrapper used for range responses.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

impl<T> DataEnvelope<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}
