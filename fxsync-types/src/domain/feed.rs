//! Parser for the CNB daily fixing text feed.
//!
//! The feed looks like:
//!
//! ```text
//! 02.01.2024 #1
//! Country|Currency|Amount|Code|Rate
//! Australia|dollar|1|AUD|15,293
//! Japan|yen|100|JPY|15,846
//! ```
//!
//! Parsing never fails as a whole. Rows that cannot be turned into a rate are
//! dropped and reported as [`ParseDiagnostic`]s.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::currency::CurrencyCode;
use super::rate::validate_rate;

/// Column header line that precedes the rate rows.
pub const FEED_HEADER: &str = "Country|Currency|Amount|Code|Rate";

const FIELD_SEPARATOR: char = '|';
const FIELD_COUNT: usize = 5;
const FIXING_DATE_FORMAT: &str = "%d.%m.%Y";

/// A successfully parsed feed row.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    /// 1-based line number in the feed
    pub line: usize,
    /// Country label (first column)
    pub country: String,
    /// Currency name (second column)
    pub currency: String,
    /// Number of foreign units the published rate refers to, if readable
    pub amount: Option<u32>,
    pub code: CurrencyCode,
    /// Rate column exactly as published (comma decimal separator)
    pub raw_rate: String,
    /// Published rate with a dot decimal separator
    pub rate: f64,
}

/// Why a row was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticKind {
    MalformedRow,
    InvalidCode,
    InvalidRate,
}

/// Non-fatal warning about a feed row that never reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ParseDiagnostic {
    /// 1-based line number in the feed
    pub line: usize,
    /// Country label of the offending row
    #[schema(example = "Czech Republic")]
    pub country: String,
    /// Code column as published (may be invalid)
    pub code: String,
    pub kind: DiagnosticKind,
    pub message: String,
}

/// Output of [`parse_feed`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedFeed {
    /// Date printed on the first line of the feed, if present
    pub fixing_date: Option<NaiveDate>,
    /// Sequence number printed after the date (`#NNN`)
    pub sequence: Option<u32>,
    /// Rows in feed order
    pub rows: Vec<ParsedRow>,
    pub diagnostics: Vec<ParseDiagnostic>,
}

impl ParsedFeed {
    /// True when the feed carried no rows and nothing was dropped.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.diagnostics.is_empty()
    }
}

/// Parses raw feed text into rows and diagnostics.
///
/// Text without the header line yields an empty result.
pub fn parse_feed(raw: &str) -> ParsedFeed {
    let mut feed = ParsedFeed::default();
    let mut header_found = false;

    for (index, line) in raw.lines().enumerate() {
        let trimmed = line.trim();

        if !header_found {
            if trimmed.starts_with(FEED_HEADER) {
                header_found = true;
            } else if feed.fixing_date.is_none() {
                if let Some((date, sequence)) = parse_fixing_line(trimmed) {
                    feed.fixing_date = Some(date);
                    feed.sequence = sequence;
                }
            }
            continue;
        }

        if trimmed.is_empty() {
            continue;
        }

        match parse_row(index + 1, trimmed) {
            Ok(row) => feed.rows.push(row),
            Err(diagnostic) => feed.diagnostics.push(diagnostic),
        }
    }

    feed
}

/// Parses the `DD.MM.YYYY #NNN` line printed above the header.
fn parse_fixing_line(line: &str) -> Option<(NaiveDate, Option<u32>)> {
    let mut parts = line.split_whitespace();
    let date = NaiveDate::parse_from_str(parts.next()?, FIXING_DATE_FORMAT).ok()?;
    let sequence = parts
        .next()
        .and_then(|s| s.strip_prefix('#'))
        .and_then(|s| s.parse().ok());
    Some((date, sequence))
}

fn parse_row(line: usize, text: &str) -> Result<ParsedRow, ParseDiagnostic> {
    let fields: Vec<&str> = text.split(FIELD_SEPARATOR).map(str::trim).collect();

    let &[country, currency, amount, code, raw_rate] = fields.as_slice() else {
        return Err(ParseDiagnostic {
            line,
            country: fields.first().copied().unwrap_or_default().to_string(),
            code: fields.get(3).copied().unwrap_or_default().to_string(),
            kind: DiagnosticKind::MalformedRow,
            message: format!("expected {} fields, found {}", FIELD_COUNT, fields.len()),
        });
    };

    let diagnostic = |kind, message: String| ParseDiagnostic {
        line,
        country: country.to_string(),
        code: code.to_string(),
        kind,
        message,
    };

    let parsed_code = CurrencyCode::parse(code).map_err(|e| {
        diagnostic(DiagnosticKind::InvalidCode, e.to_string())
    })?;

    let rate = parse_decimal(raw_rate).ok_or_else(|| {
        diagnostic(
            DiagnosticKind::InvalidRate,
            format!("cannot parse rate {:?} for {}", raw_rate, country),
        )
    })?;

    Ok(ParsedRow {
        line,
        country: country.to_string(),
        currency: currency.to_string(),
        amount: amount.parse().ok(),
        code: parsed_code,
        raw_rate: raw_rate.to_string(),
        rate,
    })
}

/// Parses a comma-decimal number into a positive finite value.
fn parse_decimal(raw: &str) -> Option<f64> {
    let normalized = raw.replace(',', ".");
    normalized.parse::<f64>().ok().and_then(|v| validate_rate(v).ok())
}
