//! Fixing feed source port.
//!
//! This trait defines the interface for fetching the upstream daily feed.
//! Implementations can be HTTP clients, canned fixtures, etc.

use std::time::Duration;

use chrono::NaiveDate;

/// Error type for feed fetches.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    #[error("Feed request failed: {0}")]
    Network(String),

    #[error("Feed responded with HTTP {status}")]
    Status { status: u16 },

    #[error("Feed request timed out after {0:?}")]
    Timeout(Duration),
}

/// Port trait for the upstream fixing feed.
#[async_trait::async_trait]
pub trait FeedSource: Send + Sync + 'static {
    /// Fetches the raw feed text published for `date`.
    ///
    /// Formatting the date into the upstream's own convention is the
    /// adapter's job.
    async fn fetch_daily(&self, date: NaiveDate) -> Result<String, FetchError>;
}
