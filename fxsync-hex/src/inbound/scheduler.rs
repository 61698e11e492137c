//! Background scheduler for the daily feed sync.
//!
//! Seeds today's rates once at startup, then syncs today's date every day at
//! a fixed local time.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDateTime, NaiveTime, TimeDelta};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use fxsync_types::{FeedSource, RateStore, SyncStatus};

use crate::RateService;

/// Timer that drives `sync_one_day(today)`.
pub struct DailySync;

impl DailySync {
    /// Spawns the scheduler loop. Abort the returned handle to stop it.
    pub fn spawn<S: RateStore, F: FeedSource>(
        service: Arc<RateService<S, F>>,
        at: NaiveTime,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(%at, "daily sync scheduler started");

            // Startup seed, before the first scheduled run.
            run_once(&service).await;

            loop {
                let delay = delay_until(Local::now().naive_local(), at);
                info!(next_run_in_secs = delay.as_secs(), "next scheduled sync");
                tokio::time::sleep(delay).await;
                run_once(&service).await;
            }
        })
    }
}

/// Syncs the current local date and logs the outcome.
async fn run_once<S: RateStore, F: FeedSource>(service: &RateService<S, F>) {
    let today = Local::now().date_naive();
    let summary = service.sync_one_day(today).await;

    match summary.status {
        SyncStatus::Completed => info!(
            date = %today,
            rows = summary.rows_upserted,
            "scheduled sync completed"
        ),
        SyncStatus::Partial | SyncStatus::Failed => warn!(
            date = %today,
            status = ?summary.status,
            rows = summary.rows_upserted,
            errors = summary.errors.len(),
            "scheduled sync did not complete"
        ),
    }
}

/// Time from `now` until the next occurrence of `at` (strictly in the future).
pub fn delay_until(now: NaiveDateTime, at: NaiveTime) -> Duration {
    let mut next = now.date().and_time(at);
    if next <= now {
        next += TimeDelta::days(1);
    }
    (next - now).to_std().unwrap_or(Duration::ZERO)
}
