//! Rate store port trait.
//!
//! This is the primary port in our hexagonal architecture.
//! Adapters (Postgres, SQLite, in-memory) implement this trait.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::domain::{CurrencyCode, DateRange, RateRecord};
use crate::error::StoreError;

/// Persistence port for fixing rates.
///
/// `upsert_rate` MUST be atomic per `(code, date)` key. Two racing upserts for
/// the same key leave exactly one record holding one of the two rates.
/// Implementations should rely on a unique constraint and a single
/// insert-or-update statement rather than a lookup followed by a save.
#[async_trait::async_trait]
pub trait RateStore: Send + Sync + 'static {
    /// Inserts the rate for `(code, date)` or replaces the existing one.
    async fn upsert_rate(
        &self,
        code: &CurrencyCode,
        date: NaiveDate,
        rate: f64,
    ) -> Result<RateRecord, StoreError>;

    /// Returns records dated within `range` whose code is in `codes`.
    ///
    /// No ordering is guaranteed.
    async fn query_range(
        &self,
        range: DateRange,
        codes: &BTreeSet<CurrencyCode>,
    ) -> Result<Vec<RateRecord>, StoreError>;

    /// Returns every stored record.
    async fn find_all(&self) -> Result<Vec<RateRecord>, StoreError>;
}
