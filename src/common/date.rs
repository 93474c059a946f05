//! Calendar-day helpers shared by the aggregation pipeline and the resolver.
//!
//! Dates cross the process boundary as `YYYY-MM-DD` strings. They are parsed
//! once here and travel as [`NaiveDate`] everywhere else.

use chrono::{Days, NaiveDate, NaiveTime};
use thiserror::Error;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DateError {
    #[error("invalid date '{input}': expected YYYY-MM-DD")]
    Malformed { input: String },
    #[error("start date {start} is after end date {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
}

/// Parses a canonical `YYYY-MM-DD` day. Unpadded forms such as `2022-1-1`
/// are rejected so that every accepted input round-trips through [`format_day`].
pub fn parse_day(input: &str) -> Result<NaiveDate, DateError> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .ok()
        .filter(|date| format_day(*date) == trimmed)
        .ok_or_else(|| DateError::Malformed {
            input: input.to_string(),
        })
}

pub fn format_day(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_range(start: &str, end: &str) -> Result<(NaiveDate, NaiveDate), DateError> {
    let start = parse_day(start)?;
    let end = parse_day(end)?;
    ensure_ordered(start, end)?;
    Ok((start, end))
}

pub fn ensure_ordered(start: NaiveDate, end: NaiveDate) -> Result<(), DateError> {
    if start > end {
        return Err(DateError::InvertedRange { start, end });
    }
    Ok(())
}

/// Seconds since the epoch at UTC midnight of `date`, shifted by whole days.
pub fn day_timestamp(date: NaiveDate, delta_days: i64) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp() + delta_days * SECONDS_PER_DAY
}

/// Every day in `[start, end]`, ascending. Empty when `start > end`.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|day| *day <= end).collect()
}

/// Number of days in the inclusive range `[start, end]`.
pub fn span_len(start: NaiveDate, end: NaiveDate) -> usize {
    let days = end.signed_duration_since(start).num_days();
    usize::try_from(days + 1).unwrap_or(0)
}

pub fn days_before(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN)
}
