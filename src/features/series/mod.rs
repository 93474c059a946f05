use crate::common::date::span_len;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// A per-country value. DNS latency is numeric; the IPv6 share is kept as a
/// fixed two-decimal string so consumers never see float drift.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

impl MetricValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Number(value) => Some(*value),
            MetricValue::Text(text) => text.parse().ok(),
        }
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        MetricValue::Number(value)
    }
}

impl From<String> for MetricValue {
    fn from(value: String) -> Self {
        MetricValue::Text(value)
    }
}

pub type DailyMetrics = BTreeMap<String, MetricValue>;

/// One calendar day of per-country values. Serialized as
/// `{"name": "YYYY-MM-DD", "<key>": value, ...}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    #[serde(rename = "name")]
    pub date: NaiveDate,
    #[serde(flatten)]
    pub metrics: DailyMetrics,
}

impl DailyRecord {
    pub fn new(date: NaiveDate, metrics: DailyMetrics) -> Self {
        Self { date, metrics }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SeriesError {
    #[error("daily series is empty")]
    Empty,
    #[error("daily series is out of order: {next} follows {previous}")]
    OutOfOrder { previous: NaiveDate, next: NaiveDate },
    #[error("daily series has a gap between {previous} and {next}")]
    Gap { previous: NaiveDate, next: NaiveDate },
}

/// A non-empty, strictly ascending, gap-free run of daily records.
///
/// This is the cache the resolver reads from. The invariants are checked
/// once at construction so lookups can rely on them.
#[derive(Clone, Debug, PartialEq)]
pub struct DailySeries {
    records: Vec<DailyRecord>,
    first: NaiveDate,
    last: NaiveDate,
}

impl DailySeries {
    pub fn new(records: Vec<DailyRecord>) -> Result<Self, SeriesError> {
        let (Some(first), Some(last)) = (records.first(), records.last()) else {
            return Err(SeriesError::Empty);
        };
        let (first, last) = (first.date, last.date);
        check_contiguous(&records)?;
        Ok(Self {
            records,
            first,
            last,
        })
    }

    pub fn records(&self) -> &[DailyRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<DailyRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.first
    }

    pub fn last_date(&self) -> NaiveDate {
        self.last
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first <= date && date <= self.last
    }

    /// Index of the record for `date`, if cached.
    pub fn position(&self, date: NaiveDate) -> Option<usize> {
        self.records
            .binary_search_by_key(&date, |record| record.date)
            .ok()
    }

    /// Records strictly between the first and last day.
    pub fn interior(&self) -> &[DailyRecord] {
        self.records
            .get(1..self.records.len().saturating_sub(1))
            .unwrap_or(&[])
    }
}

/// Checks that each record is exactly one day after its predecessor.
pub fn check_contiguous(records: &[DailyRecord]) -> Result<(), SeriesError> {
    for pair in records.windows(2) {
        let (previous, next) = (pair[0].date, pair[1].date);
        if next <= previous {
            return Err(SeriesError::OutOfOrder { previous, next });
        }
        if previous.succ_opt() != Some(next) {
            return Err(SeriesError::Gap { previous, next });
        }
    }
    Ok(())
}

/// True when `records` holds exactly one record per day of `[start, end]`.
pub fn covers_exactly(records: &[DailyRecord], start: NaiveDate, end: NaiveDate) -> bool {
    records.len() == span_len(start, end)
        && records.first().is_some_and(|record| record.date == start)
        && records.last().is_some_and(|record| record.date == end)
        && check_contiguous(records).is_ok()
}
