//! End-to-end test: the typed client against a live server on a loopback port.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::net::TcpListener;

use fxsync_client::{ClientError, FxsyncClient};
use fxsync_hex::{RateService, inbound::HttpServer};
use fxsync_repo::build_repo;
use fxsync_types::{FeedSource, FetchError, SyncStatus};

/// USD moves by one crown per day; the 3rd of the month is unavailable.
struct SteppingFeed;

#[async_trait]
impl FeedSource for SteppingFeed {
    async fn fetch_daily(&self, date: NaiveDate) -> Result<String, FetchError> {
        let day: u32 = date.format("%d").to_string().parse().unwrap_or(1);
        if day == 3 {
            return Err(FetchError::Network("connection reset".into()));
        }
        Ok(format!(
            "{} #{day}\nCountry|Currency|Amount|Code|Rate\nUSA|dollar|1|USD|{},000\nJapan|yen|100|JPY|15,000\n",
            date.format("%d.%m.%Y"),
            20 + day
        ))
    }
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

async fn spawn_server() -> FxsyncClient {
    let repo = build_repo("sqlite::memory:").await.unwrap();
    let service = Arc::new(RateService::new(repo, SteppingFeed));
    let router = HttpServer::with_rate_limit(service, 100).router();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    FxsyncClient::new(format!("http://{}", addr))
}

#[tokio::test]
async fn test_sync_and_report_through_client() {
    let client = spawn_server().await;
    assert!(client.health().await.unwrap());

    let range = client.sync_range(day(1), day(4)).await.unwrap();
    assert_eq!(range.summaries.len(), 4);
    assert_eq!(range.days_failed, 1);
    assert_eq!(range.summaries[2].status, SyncStatus::Failed);
    assert_eq!(range.rows_upserted, 6);

    let report = client
        .report(day(1), day(4), ["USD", "JPY"])
        .await
        .unwrap();
    assert_eq!(report.len(), 2);
    assert_eq!(report[0].currency_code.as_str(), "JPY");
    assert_eq!(report[0].min_rate, 15.0);
    assert_eq!(report[0].max_rate, 15.0);
    assert_eq!(report[0].avg_rate, 15.0);
    assert_eq!(report[1].currency_code.as_str(), "USD");
    assert_eq!(report[1].min_rate, 21.0);
    assert_eq!(report[1].max_rate, 24.0);
    assert_eq!(report[1].samples, 3);

    let rates = client.rates().await.unwrap();
    assert_eq!(rates.len(), 6);
}

#[tokio::test]
async fn test_failed_day_comes_back_as_summary() {
    let client = spawn_server().await;

    let summary = client.sync_day(day(3)).await.unwrap();

    assert!(summary.is_failed());
    assert_eq!(summary.rows_upserted, 0);
}

#[tokio::test]
async fn test_api_errors_carry_status_and_message() {
    let client = spawn_server().await;

    let err = client.sync_range(day(4), day(1)).await.unwrap_err();

    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 400);
            assert!(message.contains("start"));
        }
        other => panic!("expected API error, got {other:?}"),
    }
}
