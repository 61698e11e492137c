//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use fxsync_types::domain::{CurrencyCode, DiagnosticKind, ParseDiagnostic, RateRecord};
use fxsync_types::dto::{
    CurrencyReport, SyncIssue, SyncRangeResponse, SyncStatus, SyncSummary,
};
use utoipa::OpenApi;

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// Sync one date from the upstream feed
#[utoipa::path(
    post,
    path = "/api/sync/{date}",
    tag = "sync",
    params(
        ("date" = String, Path, description = "Date to sync (YYYY-MM-DD)")
    ),
    responses(
        (status = 200, description = "Date synced (possibly partially)", body = SyncSummary),
        (status = 400, description = "Invalid date"),
        (status = 429, description = "Sync rate limit exceeded"),
        (status = 502, description = "Feed could not be fetched or nothing was stored", body = SyncSummary)
    )
)]
async fn sync_day() {}

/// Sync every date in an inclusive range, one date at a time
#[utoipa::path(
    post,
    path = "/api/sync/{start}/{end}",
    tag = "sync",
    params(
        ("start" = String, Path, description = "First date (YYYY-MM-DD)"),
        ("end" = String, Path, description = "Last date, inclusive (YYYY-MM-DD)")
    ),
    responses(
        (status = 200, description = "One summary per date, ascending", body = SyncRangeResponse),
        (status = 400, description = "Invalid date or start after end"),
        (status = 429, description = "Sync rate limit exceeded")
    )
)]
async fn sync_range() {}

/// Min/max/average rate per currency over a date range
#[utoipa::path(
    get,
    path = "/api/report/{start}/{end}/{currencies}",
    tag = "report",
    params(
        ("start" = String, Path, description = "First date (YYYY-MM-DD)"),
        ("end" = String, Path, description = "Last date, inclusive (YYYY-MM-DD)"),
        ("currencies" = String, Path, description = "Comma-separated currency codes, e.g. USD,EUR")
    ),
    responses(
        (status = 200, description = "Statistics ordered by currency code; codes without data are omitted", body = Vec<CurrencyReport>),
        (status = 400, description = "Invalid date, range or currency code")
    )
)]
async fn report() {}

/// Every stored rate record
#[utoipa::path(
    get,
    path = "/api/rates",
    tag = "rates",
    responses(
        (status = 200, description = "All records ordered by date then code", body = Vec<RateRecord>)
    )
)]
async fn list_rates() {}

/// OpenAPI documentation for the fixing rate API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Fxsync Fixing Rate API",
        version = "1.0.0",
        description = "Syncs the Czech National Bank daily exchange rate fixing into a local store and reports min/max/average rates over date ranges.\n\nDates use `YYYY-MM-DD`. Sync endpoints are rate limited per client (`X-Forwarded-For`).",
        license(name = "MIT"),
    ),
    paths(health, sync_day, sync_range, report, list_rates),
    components(
        schemas(
            SyncSummary,
            SyncStatus,
            SyncIssue,
            SyncRangeResponse,
            ParseDiagnostic,
            DiagnosticKind,
            CurrencyReport,
            RateRecord,
            CurrencyCode,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sync", description = "Pull fixings from the upstream feed"),
        (name = "report", description = "Aggregated statistics"),
        (name = "rates", description = "Stored records"),
    )
)]
pub struct ApiDoc;
