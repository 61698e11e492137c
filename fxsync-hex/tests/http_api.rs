//! Integration tests for the HTTP adapter.
//!
//! These tests drive the full router (handlers, rate limiting and error
//! mapping) against the in-memory store and a canned feed.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    extract::ConnectInfo,
    http::{Method, Request, StatusCode},
};
use chrono::NaiveDate;
use http_body_util::BodyExt;
use tower::ServiceExt;

use fxsync_hex::{
    RateService,
    inbound::{HttpServer, RateLimiterState},
};
use fxsync_repo::MemoryRepo;
use fxsync_types::{FeedSource, FetchError};

/// Publishes the same two rows for every date, except 2024-01-02 which fails.
struct CannedFeed;

#[async_trait]
impl FeedSource for CannedFeed {
    async fn fetch_daily(&self, date: NaiveDate) -> Result<String, FetchError> {
        if date == NaiveDate::from_ymd_opt(2024, 1, 2).unwrap() {
            return Err(FetchError::Status { status: 503 });
        }
        let rate = if date.format("%d").to_string() == "01" { "23,000" } else { "25,000" };
        Ok(format!(
            "{} #1\nCountry|Currency|Amount|Code|Rate\nUSA|dollar|1|USD|{}\nEMU|euro|1|EUR|25,000\nBadRow|x|y|XYZ|notanumber\n",
            date.format("%d.%m.%Y"),
            rate
        ))
    }
}

/// Helper to create a test router with the given sync quota.
fn create_app(requests_per_minute: u32) -> Router {
    let service = Arc::new(RateService::new(MemoryRepo::new(), CannedFeed));
    HttpServer::with_rate_limit(service, requests_per_minute).router()
}

fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = create_app(10);

    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "healthy");
}

#[tokio::test]
async fn test_sync_day_then_list_rates() {
    let app = create_app(10);

    let response = app.clone().oneshot(post("/api/sync/2024-01-01")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let summary = json_body(response).await;
    assert_eq!(summary["status"], "COMPLETED");
    assert_eq!(summary["rows_upserted"], 2);
    assert_eq!(summary["diagnostics"][0]["code"], "XYZ");
    assert_eq!(summary["diagnostics"][0]["kind"], "INVALID_RATE");

    let response = app.oneshot(get("/api/rates")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let rates = json_body(response).await;
    let rates = rates.as_array().unwrap();
    assert_eq!(rates.len(), 2);
    assert_eq!(rates[0]["currency_code"], "EUR");
    assert_eq!(rates[0]["date"], "2024-01-01");
}

#[tokio::test]
async fn test_failed_sync_day_is_bad_gateway_with_summary() {
    let app = create_app(10);

    let response = app.oneshot(post("/api/sync/2024-01-02")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let summary = json_body(response).await;
    assert_eq!(summary["status"], "FAILED");
    assert_eq!(summary["errors"][0]["kind"], "FETCH");
}

#[tokio::test]
async fn test_sync_range_and_report() {
    let app = create_app(10);

    let response = app
        .clone()
        .oneshot(post("/api/sync/2024-01-01/2024-01-03"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let range = json_body(response).await;
    assert_eq!(range["summaries"].as_array().unwrap().len(), 3);
    assert_eq!(range["summaries"][1]["date"], "2024-01-02");
    assert_eq!(range["summaries"][1]["status"], "FAILED");
    assert_eq!(range["days_failed"], 1);
    assert_eq!(range["rows_upserted"], 4);

    let response = app
        .oneshot(get("/api/report/2024-01-01/2024-01-03/usd,EUR,CHF"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let report = json_body(response).await;
    let report = report.as_array().unwrap();
    assert_eq!(report.len(), 2);
    assert_eq!(report[0]["currency_code"], "EUR");
    assert_eq!(report[0]["avg_rate"], 25.0);
    assert_eq!(report[1]["currency_code"], "USD");
    assert_eq!(report[1]["min_rate"], 23.0);
    assert_eq!(report[1]["max_rate"], 25.0);
    assert_eq!(report[1]["avg_rate"], 24.0);
}

#[tokio::test]
async fn test_bad_input_is_400() {
    let app = create_app(10);

    for request in [
        get("/api/report/2024-13-01/2024-01-03/USD"),
        get("/api/report/2024-01-03/2024-01-01/USD"),
        get("/api/report/2024-01-01/2024-01-03/DOLLARS"),
        post("/api/sync/yesterday"),
        post("/api/sync/2024-01-03/2024-01-01"),
        post("/api/sync/0001-01-01/+262142-12-31"),
        post("/api/sync/0001-01-01/9999-12-31"),
    ] {
        let uri = request.uri().to_string();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(json_body(response).await["code"], 400);
    }
}

#[tokio::test]
async fn test_sync_routes_return_429_when_quota_exceeded() {
    let app = create_app(2);

    for _ in 0..2 {
        let response = app.clone().oneshot(post("/api/sync/2024-01-01")).await.unwrap();
        assert_ne!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    let response = app.clone().oneshot(post("/api/sync/2024-01-01")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let json = json_body(response).await;
    assert!(
        json["error"]
            .as_str()
            .unwrap()
            .contains("Rate limit exceeded")
    );
    assert_eq!(json["retry_after_seconds"], 60);

    // Queries are not throttled.
    let response = app.oneshot(get("/api/rates")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

fn sync_from(peer: &str, forwarded: &str) -> Request<Body> {
    let peer: SocketAddr = peer.parse().unwrap();
    Request::builder()
        .method(Method::POST)
        .uri("/api/sync/2024-01-01")
        .header("X-Forwarded-For", forwarded)
        .extension(ConnectInfo(peer))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_rotating_forwarded_for_does_not_reset_quota() {
    let app = create_app(1);

    let response = app
        .clone()
        .oneshot(sync_from("192.0.2.10:5000", "198.51.100.1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(sync_from("192.0.2.10:5001", "198.51.100.2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let response = app
        .oneshot(sync_from("192.0.2.11:5000", "198.51.100.1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_sync_quota_is_per_client_behind_trusted_proxy() {
    let service = Arc::new(RateService::new(MemoryRepo::new(), CannedFeed));
    let limiter = RateLimiterState::new(1, Duration::from_secs(60)).trust_forwarded_for(true);
    let app = HttpServer::with_rate_limiter(service, limiter).router();

    let proxy = "10.0.0.1:443";
    let response = app.clone().oneshot(sync_from(proxy, "198.51.100.1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let response = app.clone().oneshot(sync_from(proxy, "198.51.100.1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let response = app.oneshot(sync_from(proxy, "198.51.100.2")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = create_app(10);

    let response = app.oneshot(get("/api-docs/openapi.json")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let doc = json_body(response).await;
    assert!(doc["paths"]["/api/report/{start}/{end}/{currencies}"].is_object());
}
