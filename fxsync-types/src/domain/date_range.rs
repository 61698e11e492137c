//! Inclusive calendar date ranges.

use chrono::NaiveDate;
use std::fmt;

use crate::error::DomainError;

/// Boundary date format (`YYYY-MM-DD`).
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a caller-supplied `YYYY-MM-DD` date.
///
/// Only four-digit years are accepted; chrono's signed extended years
/// (`+262142-12-31`) are rejected.
pub fn parse_iso_date(raw: &str) -> Result<NaiveDate, DomainError> {
    let trimmed = raw.trim();
    let bytes = trimmed.as_bytes();
    if bytes.len() != 10 || !bytes[..4].iter().all(u8::is_ascii_digit) {
        return Err(DomainError::InvalidDate(raw.to_string()));
    }
    NaiveDate::parse_from_str(trimmed, ISO_DATE_FORMAT)
        .map_err(|_| DomainError::InvalidDate(raw.to_string()))
}

/// A range of calendar dates, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Creates a new date range, validating that start <= end.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DomainError> {
        if start > end {
            return Err(DomainError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Like [`DateRange::new`], but also rejects ranges spanning more than `max_days`.
    pub fn bounded(start: NaiveDate, end: NaiveDate, max_days: usize) -> Result<Self, DomainError> {
        let range = Self::new(start, end)?;
        let days = range.total_days();
        if days > max_days {
            return Err(DomainError::RangeTooLong {
                days,
                max: max_days,
            });
        }
        Ok(range)
    }

    /// Creates a range covering a single day.
    pub fn single_day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Iterates every date in the range in ascending order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    /// Returns the number of days in the range.
    pub fn total_days(&self) -> usize {
        ((self.end - self.start).num_days() + 1) as usize
    }

    /// Returns true if the range contains the given date.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}
