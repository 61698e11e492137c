//! In-memory repository adapter.
//!
//! Nothing survives a restart. Useful for demos and for running the service
//! without a database (`DATABASE_URL=memory://`).

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;

use fxsync_types::{CurrencyCode, DateRange, RateRecord, RateStore, StoreError};

/// Rate store keyed by `(code, date)` in a sharded concurrent map.
#[derive(Default)]
pub struct MemoryRepo {
    rates: DashMap<(CurrencyCode, NaiveDate), RateRecord>,
}

impl MemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

#[async_trait]
impl RateStore for MemoryRepo {
    async fn upsert_rate(
        &self,
        code: &CurrencyCode,
        date: NaiveDate,
        rate: f64,
    ) -> Result<RateRecord, StoreError> {
        let record = RateRecord::new(code.clone(), date, rate)?;
        // `insert` holds the shard lock, so racing writers to one key converge.
        self.rates.insert((code.clone(), date), record.clone());
        Ok(record)
    }

    async fn query_range(
        &self,
        range: DateRange,
        codes: &BTreeSet<CurrencyCode>,
    ) -> Result<Vec<RateRecord>, StoreError> {
        Ok(self
            .rates
            .iter()
            .filter(|entry| {
                let (code, date) = entry.key();
                range.contains(*date) && codes.contains(code)
            })
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn find_all(&self) -> Result<Vec<RateRecord>, StoreError> {
        let mut records: Vec<RateRecord> =
            self.rates.iter().map(|entry| entry.value().clone()).collect();
        records.sort_by(|a, b| (a.date, &a.currency_code).cmp(&(b.date, &b.currency_code)));
        Ok(records)
    }
}
