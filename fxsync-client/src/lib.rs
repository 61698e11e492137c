//! # Fxsync Client SDK
//!
//! A typed Rust client for the fixing rate API.

use chrono::NaiveDate;
use fxsync_types::{CurrencyReport, RateRecord, SyncRangeResponse, SyncSummary};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Fixing rate API client.
pub struct FxsyncClient {
    base_url: String,
    http: Client,
}

impl FxsyncClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    /// Syncs one date.
    ///
    /// A failed sync is still returned as a summary (status `FAILED`), the
    /// server answers it with 502 and the summary as body.
    pub async fn sync_day(&self, date: NaiveDate) -> Result<SyncSummary, ClientError> {
        let resp = self
            .http
            .post(format!("{}/api/sync/{}", self.base_url, date))
            .send()
            .await?;

        if resp.status() == StatusCode::BAD_GATEWAY {
            let body = resp.text().await?;
            if let Ok(summary) = serde_json::from_str::<SyncSummary>(&body) {
                return Ok(summary);
            }
            return Err(ClientError::Api {
                status: StatusCode::BAD_GATEWAY.as_u16(),
                message: body,
            });
        }
        self.handle_response(resp).await
    }

    /// Syncs every date from `start` to `end`, inclusive.
    pub async fn sync_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<SyncRangeResponse, ClientError> {
        self.post(&format!("/api/sync/{}/{}", start, end)).await
    }

    /// Min/max/average per currency over an inclusive range, ordered by code.
    pub async fn report<I, T>(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        codes: I,
    ) -> Result<Vec<CurrencyReport>, ClientError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let codes = codes
            .into_iter()
            .map(|c| c.as_ref().trim().to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.get(&format!("/api/report/{}/{}/{}", start, end, codes))
            .await
    }

    /// Lists every stored rate.
    pub async fn rates(&self) -> Result<Vec<RateRecord>, ClientError> {
        self.get("/api/rates").await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let resp = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?;
        self.handle_response(resp).await
    }

    async fn post<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .send()
            .await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or(body);
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}
