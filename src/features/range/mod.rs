mod daily;

pub use daily::{DailySource, DnsDaily, Ipv6Daily};

use crate::common::date::date_range;
use crate::features::provider::ProviderError;
use crate::features::series::DailyRecord;
use chrono::NaiveDate;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ComputeError {
    #[error("measurement fetch for {date} failed: {source}")]
    Provider {
        date: NaiveDate,
        #[source]
        source: ProviderError,
    },
    #[error("cannot compute range: start {start} is after end {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
}

/// Produces one record per day of an inclusive date range.
///
/// This is the expensive fallback the resolver tries to avoid calling.
pub trait RangeSource {
    fn compute(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<DailyRecord>, ComputeError>;
}

impl<F> RangeSource for F
where
    F: Fn(NaiveDate, NaiveDate) -> Result<Vec<DailyRecord>, ComputeError>,
{
    fn compute(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<DailyRecord>, ComputeError> {
        self(start, end)
    }
}

/// Runs a [`DailySource`] once per calendar day. The output is ascending and
/// contiguous by construction.
#[derive(Clone, Debug)]
pub struct RangeComputer<S> {
    source: S,
}

impl<S: DailySource> RangeComputer<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: DailySource> RangeSource for RangeComputer<S> {
    fn compute(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<DailyRecord>, ComputeError> {
        if start > end {
            return Err(ComputeError::InvertedRange { start, end });
        }
        debug!(start = %start, end = %end, "computing daily records");
        date_range(start, end)
            .into_iter()
            .map(|date| {
                let metrics = self.source.metrics_for(date)?;
                Ok(DailyRecord::new(date, metrics))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests;
