//! HTTP client for the CNB daily fixing feed.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;

use fxsync_types::{FeedSource, FetchError};

/// Published daily fixing endpoint.
pub const DEFAULT_FEED_URL: &str =
    "https://www.cnb.cz/en/financial_markets/foreign_exchange_market/exchange_rate_fixing/daily.txt";

/// Date format the feed expects in its `date` query parameter.
const FEED_DATE_FORMAT: &str = "%m.%d.%Y";

/// Formats a calendar date the way the feed expects it (`MM.DD.YYYY`).
pub fn feed_date(date: NaiveDate) -> String {
    date.format(FEED_DATE_FORMAT).to_string()
}

/// Fetches the plain-text daily feed over HTTP.
#[derive(Debug, Clone)]
pub struct CnbFeedClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl CnbFeedClient {
    /// Creates a client for `base_url` with a per-request `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .user_agent(format!("fxsync/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn map_error(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else if let Some(status) = err.status() {
            FetchError::Status {
                status: status.as_u16(),
            }
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

#[async_trait]
impl FeedSource for CnbFeedClient {
    async fn fetch_daily(&self, date: NaiveDate) -> Result<String, FetchError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("date", feed_date(date))])
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| self.map_error(e))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::{Router, extract::Query, http::StatusCode, routing::get};

    use super::*;

    /// Serves a fake feed on an ephemeral port and returns its base URL.
    async fn spawn_feed() -> String {
        let app = Router::new()
            .route(
                "/daily.txt",
                get(|Query(params): Query<HashMap<String, String>>| async move {
                    format!(
                        "{} #1\nCountry|Currency|Amount|Code|Rate\nEMU|euro|1|EUR|25,000\n",
                        params.get("date").cloned().unwrap_or_default()
                    )
                }),
            )
            .route(
                "/down.txt",
                get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
            )
            .route(
                "/slow.txt",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(2)).await;
                    "too late"
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_feed_date_is_month_first() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(feed_date(date), "03.07.2024");
    }

    #[tokio::test]
    async fn test_fetch_sends_feed_formatted_date() {
        let base = spawn_feed().await;
        let client = CnbFeedClient::new(format!("{}/daily.txt", base), Duration::from_secs(5)).unwrap();

        let body = client
            .fetch_daily(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())
            .await
            .unwrap();

        assert!(body.starts_with("01.02.2024 #1"));
        assert!(body.contains("EUR|25,000"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_a_fetch_error() {
        let base = spawn_feed().await;
        let client = CnbFeedClient::new(format!("{}/down.txt", base), Duration::from_secs(5)).unwrap();

        let result = client
            .fetch_daily(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())
            .await;

        assert!(matches!(result, Err(FetchError::Status { status: 503 })));
    }

    #[tokio::test]
    async fn test_slow_feed_is_a_timeout() {
        let base = spawn_feed().await;
        let timeout = Duration::from_millis(200);
        let client = CnbFeedClient::new(format!("{}/slow.txt", base), timeout).unwrap();

        let started = std::time::Instant::now();
        let result = client
            .fetch_daily(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())
            .await;

        assert!(matches!(result, Err(FetchError::Timeout(t)) if t == timeout));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_default_url_points_at_daily_feed() {
        let client = CnbFeedClient::new(DEFAULT_FEED_URL, Duration::from_secs(30)).unwrap();
        assert!(client.base_url().ends_with("/daily.txt"));
    }
}
