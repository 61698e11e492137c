//! Domain models for the fixing rate service.

pub mod currency;
pub mod date_range;
pub mod feed;
pub mod rate;

pub use currency::CurrencyCode;
pub use date_range::{DateRange, parse_iso_date};
pub use feed::{DiagnosticKind, FEED_HEADER, ParseDiagnostic, ParsedFeed, ParsedRow, parse_feed};
pub use rate::{RateRecord, validate_rate};
