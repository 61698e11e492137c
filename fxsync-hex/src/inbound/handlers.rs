//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use fxsync_types::{AppError, CurrencyReport, DomainError, FeedSource, RateStore, parse_iso_date};

use crate::RateService;

/// Application state shared across handlers.
pub struct AppState<S: RateStore, F: FeedSource> {
    pub service: Arc<RateService<S, F>>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
        };

        let body = serde_json::json!({
            "error": message,
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Sync a single date. A failed sync still carries its summary, under 502.
#[tracing::instrument(skip(state))]
pub async fn sync_day<S: RateStore, F: FeedSource>(
    State(state): State<Arc<AppState<S, F>>>,
    Path(date): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let date = parse_iso_date(&date)?;
    let summary = state.service.sync_one_day(date).await;

    let status = if summary.is_failed() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::OK
    };
    Ok((status, Json(summary)))
}

/// Sync an inclusive date range, one date at a time.
#[tracing::instrument(skip(state))]
pub async fn sync_range<S: RateStore, F: FeedSource>(
    State(state): State<Arc<AppState<S, F>>>,
    Path((start, end)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let start = parse_iso_date(&start)?;
    let end = parse_iso_date(&end)?;
    let response = state.service.sync_range(start, end).await?;
    Ok(Json(response))
}

/// Min/max/average per currency; `currencies` is comma separated.
#[tracing::instrument(skip(state))]
pub async fn report<S: RateStore, F: FeedSource>(
    State(state): State<Arc<AppState<S, F>>>,
    Path((start, end, currencies)): Path<(String, String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let start = parse_iso_date(&start)?;
    let end = parse_iso_date(&end)?;
    let report = state
        .service
        .report(start, end, currencies.split(','))
        .await?;
    Ok(Json(CurrencyReport::from_report(report)))
}

/// Every stored record.
#[tracing::instrument(skip(state))]
pub async fn list_rates<S: RateStore, F: FeedSource>(
    State(state): State<Arc<AppState<S, F>>>,
) -> Result<impl IntoResponse, ApiError> {
    let records = state.service.all_records().await?;
    Ok(Json(records))
}
