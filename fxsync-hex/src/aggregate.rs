//! Aggregation Engine
//!
//! Min/max/average per currency, computed from a single range query.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use fxsync_types::{CurrencyCode, DateRange, RateRecord, RateReport, RateStats, RateStore, StoreError};

pub struct AggregationEngine<S: RateStore> {
    store: Arc<S>,
}

impl<S: RateStore> Clone for AggregationEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: RateStore> AggregationEngine<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Groups the records in `range` by code. Codes with no records are absent.
    #[tracing::instrument(skip(self, codes), fields(%range, codes = codes.len()))]
    pub async fn report(
        &self,
        range: DateRange,
        codes: &BTreeSet<CurrencyCode>,
    ) -> Result<RateReport, StoreError> {
        let records = self.store.query_range(range, codes).await?;
        tracing::debug!(records = records.len(), "aggregating");
        Ok(summarize(&records))
    }
}

#[derive(Default)]
struct Accumulator {
    min: f64,
    max: f64,
    sum: f64,
    count: usize,
}

impl Accumulator {
    fn push(&mut self, rate: f64) {
        if self.count == 0 {
            self.min = rate;
            self.max = rate;
        } else {
            self.min = self.min.min(rate);
            self.max = self.max.max(rate);
        }
        self.sum += rate;
        self.count += 1;
    }

    fn finish(self) -> RateStats {
        RateStats {
            min: self.min,
            max: self.max,
            avg: self.sum / self.count as f64,
            samples: self.count,
        }
    }
}

/// Order-independent grouping of records by currency code.
pub fn summarize(records: &[RateRecord]) -> RateReport {
    let mut groups: BTreeMap<CurrencyCode, Accumulator> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.currency_code.clone())
            .or_default()
            .push(record.rate);
    }

    groups
        .into_iter()
        .map(|(code, acc)| (code, acc.finish()))
        .collect()
}
