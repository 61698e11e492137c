//! Sync Engine
//!
//! Pulls the daily feed for a date, parses it and upserts every parsed row.
//! Holds no state between invocations beyond its two injected ports.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use fxsync_types::{
    DateRange, FeedSource, RateStore, SyncIssue, SyncStatus, SyncSummary, parse_feed,
};

/// Drives fetch -> parse -> upsert for single dates and date ranges.
pub struct SyncEngine<S: RateStore, F: FeedSource> {
    store: Arc<S>,
    feed: Arc<F>,
}

impl<S: RateStore, F: FeedSource> Clone for SyncEngine<S, F> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            feed: self.feed.clone(),
        }
    }
}

impl<S: RateStore, F: FeedSource> SyncEngine<S, F> {
    pub fn new(store: Arc<S>, feed: Arc<F>) -> Self {
        Self { store, feed }
    }

    /// Syncs one date. Never fails: fetch and store problems land in the summary.
    ///
    /// Rows are upserted in feed order, one at a time. Records are keyed by
    /// `date` even when the feed reports a different fixing date (weekends and
    /// holidays republish the previous fixing).
    #[tracing::instrument(skip(self), fields(%date))]
    pub async fn sync_one_day(&self, date: NaiveDate) -> SyncSummary {
        let raw = match self.feed.fetch_daily(date).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "feed fetch failed");
                return SyncSummary::fetch_failed(date, &e);
            }
        };

        let parsed = parse_feed(&raw);
        for diagnostic in &parsed.diagnostics {
            warn!(
                line = diagnostic.line,
                country = %diagnostic.country,
                code = %diagnostic.code,
                kind = ?diagnostic.kind,
                "dropped feed row: {}",
                diagnostic.message
            );
        }

        let mut rows_upserted = 0;
        let mut errors = Vec::new();
        for row in &parsed.rows {
            match self.store.upsert_rate(&row.code, date, row.rate).await {
                Ok(_) => rows_upserted += 1,
                Err(e) => {
                    warn!(code = %row.code, error = %e, "upsert failed");
                    errors.push(SyncIssue::Store {
                        currency_code: row.code.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        let status = SyncStatus::for_batch(parsed.rows.len(), rows_upserted);
        info!(
            ?status,
            rows_parsed = parsed.rows.len(),
            rows_upserted,
            dropped = parsed.diagnostics.len(),
            "date synced"
        );

        SyncSummary {
            date,
            status,
            fixing_date: parsed.fixing_date,
            rows_parsed: parsed.rows.len(),
            rows_upserted,
            diagnostics: parsed.diagnostics,
            errors,
        }
    }

    /// Syncs every date in `range`, ascending, each one finishing before the next starts.
    ///
    /// A failed date is recorded and the loop moves on.
    #[tracing::instrument(skip(self), fields(%range))]
    pub async fn sync_range(&self, range: DateRange) -> Vec<SyncSummary> {
        let mut summaries = Vec::new();
        for date in range.days() {
            summaries.push(self.sync_one_day(date).await);
        }

        let failed = summaries.iter().filter(|s| s.is_failed()).count();
        if failed > 0 {
            warn!(failed, total = summaries.len(), "range sync finished with failed dates");
        } else {
            info!(total = summaries.len(), "range sync finished");
        }
        summaries
    }
}
