//! Rate Application Service
//!
//! Validates caller input, then delegates to the sync and aggregation engines.
//! Contains NO infrastructure logic - pure orchestration.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;

use fxsync_types::{
    AppError, CurrencyCode, DateRange, DomainError, FeedSource, RateRecord, RateReport, RateStore,
    SyncRangeResponse, SyncSummary,
};

use crate::aggregate::AggregationEngine;
use crate::sync::SyncEngine;

/// Longest range a single sync request may cover.
pub const DEFAULT_MAX_SYNC_DAYS: usize = 366;

/// Application service for fixing rate operations.
///
/// Generic over the store and the feed source - both adapters are injected
/// at construction, so tests can swap in canned feeds and in-memory stores.
pub struct RateService<S: RateStore, F: FeedSource> {
    store: Arc<S>,
    sync: SyncEngine<S, F>,
    aggregation: AggregationEngine<S>,
    max_sync_days: usize,
}

impl<S: RateStore, F: FeedSource> RateService<S, F> {
    /// Creates a new service over the given store and feed.
    pub fn new(store: S, feed: F) -> Self {
        Self::from_shared(Arc::new(store), Arc::new(feed))
    }

    pub fn from_shared(store: Arc<S>, feed: Arc<F>) -> Self {
        Self {
            sync: SyncEngine::new(store.clone(), feed),
            aggregation: AggregationEngine::new(store.clone()),
            store,
            max_sync_days: DEFAULT_MAX_SYNC_DAYS,
        }
    }

    /// Overrides the longest range [`RateService::sync_range`] accepts.
    pub fn with_max_sync_days(mut self, max_sync_days: usize) -> Self {
        self.max_sync_days = max_sync_days;
        self
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Sync
    // ─────────────────────────────────────────────────────────────────────────────

    /// Syncs a single date. Failures are reported inside the summary.
    pub async fn sync_one_day(&self, date: NaiveDate) -> SyncSummary {
        self.sync.sync_one_day(date).await
    }

    /// Syncs an inclusive date range.
    ///
    /// Reversed ranges and ranges longer than the configured maximum are
    /// rejected before any fetch.
    pub async fn sync_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<SyncRangeResponse, AppError> {
        let range = DateRange::bounded(start, end, self.max_sync_days)?;
        let summaries = self.sync.sync_range(range).await;
        Ok(SyncRangeResponse::new(start, end, summaries))
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────────

    /// Min/max/average per requested code over an inclusive date range.
    ///
    /// Codes are validated and de-duplicated; an empty set is rejected.
    pub async fn report<I, T>(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        codes: I,
    ) -> Result<RateReport, AppError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let range = DateRange::new(start, end)?;
        let codes = parse_codes(codes)?;
        self.aggregation
            .report(range, &codes)
            .await
            .map_err(Into::into)
    }

    /// Every stored record, ordered by date then code.
    pub async fn all_records(&self) -> Result<Vec<RateRecord>, AppError> {
        let mut records = self.store.find_all().await?;
        records.sort_by(|a, b| (a.date, &a.currency_code).cmp(&(b.date, &b.currency_code)));
        Ok(records)
    }
}

/// Parses a list of raw codes into a non-empty set. Blank entries are skipped.
pub fn parse_codes<I, T>(codes: I) -> Result<BTreeSet<CurrencyCode>, DomainError>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let codes = codes
        .into_iter()
        .filter(|raw| !raw.as_ref().trim().is_empty())
        .map(|raw| CurrencyCode::parse(raw.as_ref()))
        .collect::<Result<BTreeSet<_>, _>>()?;

    if codes.is_empty() {
        return Err(DomainError::EmptyCurrencySet);
    }
    Ok(codes)
}
