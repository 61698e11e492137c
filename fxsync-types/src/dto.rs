//! Data Transfer Objects (DTOs) for sync results and reports.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{CurrencyCode, ParseDiagnostic};
use crate::ports::FetchError;

// ─────────────────────────────────────────────────────────────────────────────
// Sync DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome of syncing one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncStatus {
    /// Every parsed row was stored
    Completed,
    /// Some rows failed to store
    Partial,
    /// The feed could not be fetched, or no parsed row could be stored
    Failed,
}

impl SyncStatus {
    /// Derives the status of a batch from its row counts.
    pub fn for_batch(rows_parsed: usize, rows_upserted: usize) -> Self {
        if rows_parsed > 0 && rows_upserted == 0 {
            SyncStatus::Failed
        } else if rows_upserted < rows_parsed {
            SyncStatus::Partial
        } else {
            SyncStatus::Completed
        }
    }
}

/// A failure recorded while syncing one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncIssue {
    /// The feed could not be fetched
    Fetch { message: String },
    /// A parsed row could not be stored
    Store {
        currency_code: CurrencyCode,
        message: String,
    },
}

/// Per-date result of a sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SyncSummary {
    /// Requested date the rates were stored under
    #[schema(value_type = String, format = Date, example = "2024-01-02")]
    pub date: NaiveDate,
    pub status: SyncStatus,
    /// Date printed in the feed itself (differs on holidays and weekends)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = Date)]
    pub fixing_date: Option<NaiveDate>,
    /// Rows that parsed successfully
    pub rows_parsed: usize,
    /// Rows written to the store
    pub rows_upserted: usize,
    /// Rows dropped by the parser
    pub diagnostics: Vec<ParseDiagnostic>,
    pub errors: Vec<SyncIssue>,
}

impl SyncSummary {
    /// Summary for a date whose feed could not be fetched.
    pub fn fetch_failed(date: NaiveDate, error: &FetchError) -> Self {
        Self {
            date,
            status: SyncStatus::Failed,
            fixing_date: None,
            rows_parsed: 0,
            rows_upserted: 0,
            diagnostics: Vec::new(),
            errors: vec![SyncIssue::Fetch {
                message: error.to_string(),
            }],
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == SyncStatus::Failed
    }
}

/// Response for a range sync: one summary per date, ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SyncRangeResponse {
    #[schema(value_type = String, format = Date, example = "2024-01-01")]
    pub start: NaiveDate,
    #[schema(value_type = String, format = Date, example = "2024-01-31")]
    pub end: NaiveDate,
    /// Number of dates that failed
    pub days_failed: usize,
    /// Rows stored across all dates
    pub rows_upserted: usize,
    pub summaries: Vec<SyncSummary>,
}

impl SyncRangeResponse {
    pub fn new(start: NaiveDate, end: NaiveDate, summaries: Vec<SyncSummary>) -> Self {
        Self {
            start,
            end,
            days_failed: summaries.iter().filter(|s| s.is_failed()).count(),
            rows_upserted: summaries.iter().map(|s| s.rows_upserted).sum(),
            summaries,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Report DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Min/max/average of one currency over a date range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RateStats {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    /// Number of records aggregated
    pub samples: usize,
}

/// Aggregation result keyed (and ordered) by currency code.
///
/// Codes without records in range are absent.
pub type RateReport = BTreeMap<CurrencyCode, RateStats>;

/// One currency's entry in a report response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CurrencyReport {
    pub currency_code: CurrencyCode,
    #[schema(example = 23.0)]
    pub min_rate: f64,
    #[schema(example = 25.0)]
    pub max_rate: f64,
    #[schema(example = 24.0)]
    pub avg_rate: f64,
    pub samples: usize,
}

impl CurrencyReport {
    /// Flattens a report into entries ordered by currency code.
    pub fn from_report(report: RateReport) -> Vec<Self> {
        report
            .into_iter()
            .map(|(currency_code, stats)| Self {
                currency_code,
                min_rate: stats.min,
                max_rate: stats.max,
                avg_rate: stats.avg,
                samples: stats.samples,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_for_batch() {
        assert_eq!(SyncStatus::for_batch(0, 0), SyncStatus::Completed);
        assert_eq!(SyncStatus::for_batch(3, 3), SyncStatus::Completed);
        assert_eq!(SyncStatus::for_batch(3, 1), SyncStatus::Partial);
        assert_eq!(SyncStatus::for_batch(3, 0), SyncStatus::Failed);
    }

    #[test]
    fn test_issue_serialization_is_tagged() {
        let issue = SyncIssue::Store {
            currency_code: CurrencyCode::parse("EUR").unwrap(),
            message: "disk full".into(),
        };
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["kind"], "STORE");
        assert_eq!(json["currency_code"], "EUR");
    }

    #[test]
    fn test_range_response_totals() {
        let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
        let ok = SyncSummary {
            date: day(1),
            status: SyncStatus::Completed,
            fixing_date: Some(day(1)),
            rows_parsed: 2,
            rows_upserted: 2,
            diagnostics: Vec::new(),
            errors: Vec::new(),
        };
        let failed = SyncSummary::fetch_failed(day(2), &FetchError::Status { status: 503 });

        let response = SyncRangeResponse::new(day(1), day(2), vec![ok, failed]);
        assert_eq!(response.days_failed, 1);
        assert_eq!(response.rows_upserted, 2);
        assert_eq!(response.summaries.len(), 2);
    }

    #[test]
    fn test_report_entries_are_ordered_by_code() {
        let stats = RateStats {
            min: 1.0,
            max: 2.0,
            avg: 1.5,
            samples: 2,
        };
        let mut report = RateReport::new();
        report.insert(CurrencyCode::parse("USD").unwrap(), stats);
        report.insert(CurrencyCode::parse("EUR").unwrap(), stats);

        let entries = CurrencyReport::from_report(report);
        assert_eq!(entries[0].currency_code.as_str(), "EUR");
        assert_eq!(entries[1].currency_code.as_str(), "USD");
    }
}
