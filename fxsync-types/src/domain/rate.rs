//! Rate record domain model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::currency::CurrencyCode;
use crate::error::DomainError;

/// Checks that a rate is a positive finite number.
pub fn validate_rate(rate: f64) -> Result<f64, DomainError> {
    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(DomainError::InvalidRate(rate))
    }
}

/// A fixing rate for one currency on one calendar day.
///
/// `(currency_code, date)` is the record identity: the store holds at most one
/// record per pair and a later sync replaces the rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RateRecord {
    /// Foreign currency the rate applies to
    pub currency_code: CurrencyCode,
    /// Fixing date
    #[schema(value_type = String, format = Date, example = "2024-01-02")]
    pub date: NaiveDate,
    /// Local currency per one unit of the foreign currency
    #[schema(example = 24.5)]
    pub rate: f64,
    /// When the record was last written
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTime<Utc>,
}

impl RateRecord {
    /// Creates a new record stamped with the current time.
    ///
    /// # Validation
    /// - Rate must be positive and finite
    pub fn new(currency_code: CurrencyCode, date: NaiveDate, rate: f64) -> Result<Self, DomainError> {
        Ok(Self {
            currency_code,
            date,
            rate: validate_rate(rate)?,
            updated_at: Utc::now(),
        })
    }

    /// Creates a record with all fields specified (for database reconstruction).
    pub fn from_parts(
        currency_code: CurrencyCode,
        date: NaiveDate,
        rate: f64,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            currency_code,
            date,
            rate,
            updated_at,
        }
    }

    /// Returns the `(code, date)` identity of this record.
    pub fn key(&self) -> (&CurrencyCode, NaiveDate) {
        (&self.currency_code, self.date)
    }
}
