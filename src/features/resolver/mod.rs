//! Serves date ranges from a cache of daily records, computing only the
//! days the cache does not hold.
//!
//! The cache is one contiguous run `[first, last]`. A request `[start, end]`
//! falls into one of these shapes:
//!
//! ```text
//! Cached             first <= start,  end <= last      cache slice
//! CachedThenFetched  first <= start <= last < end      cache tail + compute(last, end)[1..]
//! FetchedThenCached  start < first <= end <= last      compute(start, first) + cache[1..=end]
//! Straddling         start < first,  last < end        compute(start, first) + interior + compute(last, end)
//! Disjoint           anything else                     compute(start, end)
//! ```
//!
//! Computed spans always include the boundary day they share with the
//! cache, so the cached copy of that day is the one dropped. When a
//! one-record cache is straddled, that record's day is emitted once.

use crate::common::date::span_len;
use crate::features::range::{ComputeError, RangeSource};
use crate::features::series::{DailyRecord, DailySeries, covers_exactly};
use chrono::NaiveDate;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("requested start {start} is after end {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
    #[error("{date} lies within the cached span but has no cached record")]
    DateNotCached { date: NaiveDate },
    #[error(
        "fallback for {start}..={end} returned {actual} records, expected one per day ({expected})"
    )]
    ComputeMismatch {
        start: NaiveDate,
        end: NaiveDate,
        expected: usize,
        actual: usize,
    },
    #[error(transparent)]
    Compute(#[from] ComputeError),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Coverage {
    Cached,
    CachedThenFetched,
    FetchedThenCached,
    Straddling,
    Disjoint,
}

impl Coverage {
    pub fn classify(first: NaiveDate, last: NaiveDate, start: NaiveDate, end: NaiveDate) -> Self {
        if first <= start && start <= last {
            if end <= last {
                Coverage::Cached
            } else {
                Coverage::CachedThenFetched
            }
        } else if start < first && end >= first {
            if end <= last {
                Coverage::FetchedThenCached
            } else {
                Coverage::Straddling
            }
        } else {
            Coverage::Disjoint
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Coverage::Cached => "cached",
            Coverage::CachedThenFetched => "cached_then_fetched",
            Coverage::FetchedThenCached => "fetched_then_cached",
            Coverage::Straddling => "straddling",
            Coverage::Disjoint => "disjoint",
        }
    }
}

/// Read-only view over a cache plus the fallback used for uncovered days.
pub struct FragmentedRangeResolver<'a, R: ?Sized> {
    cache: &'a DailySeries,
    compute: &'a R,
}

impl<'a, R: RangeSource + ?Sized> FragmentedRangeResolver<'a, R> {
    pub fn new(cache: &'a DailySeries, compute: &'a R) -> Self {
        Self { cache, compute }
    }

    pub fn coverage(&self, start: NaiveDate, end: NaiveDate) -> Coverage {
        Coverage::classify(self.cache.first_date(), self.cache.last_date(), start, end)
    }

    /// Records for every day of `[start, end]`, ascending and without
    /// duplicates.
    pub fn resolve(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<DailyRecord>, ResolveError> {
        if start > end {
            return Err(ResolveError::InvertedRange { start, end });
        }
        let first = self.cache.first_date();
        let last = self.cache.last_date();
        let cached = self.cache.records();
        let coverage = self.coverage(start, end);
        debug!(start = %start, end = %end, coverage = coverage.label(), "resolving range");

        match coverage {
            Coverage::Cached => {
                let from = self.index_of(start)?;
                let to = self.index_of(end)?;
                Ok(cached[from..=to].to_vec())
            }
            Coverage::CachedThenFetched => {
                let from = self.index_of(start)?;
                let mut records = cached[from..].to_vec();
                records.extend(self.fetch(last, end)?.into_iter().skip(1));
                Ok(records)
            }
            Coverage::FetchedThenCached => {
                let to = self.index_of(end)?;
                let mut records = self.fetch(start, first)?;
                records.extend_from_slice(&cached[1..=to]);
                Ok(records)
            }
            Coverage::Straddling => {
                let mut records = self.fetch(start, first)?;
                records.extend_from_slice(self.cache.interior());
                // A one-record cache has first == last, already emitted above.
                let shared = usize::from(first == last);
                records.extend(self.fetch(last, end)?.into_iter().skip(shared));
                Ok(records)
            }
            Coverage::Disjoint => self.fetch(start, end),
        }
    }

    fn index_of(&self, date: NaiveDate) -> Result<usize, ResolveError> {
        self.cache
            .position(date)
            .ok_or(ResolveError::DateNotCached { date })
    }

    fn fetch(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<DailyRecord>, ResolveError> {
        let records = self.compute.compute(start, end)?;
        if !covers_exactly(&records, start, end) {
            return Err(ResolveError::ComputeMismatch {
                start,
                end,
                expected: span_len(start, end),
                actual: records.len(),
            });
        }
        Ok(records)
    }
}
