//! # Fxsync Types
//!
//! Domain types and port traits for the fixing rate sync service.
//! This crate has ZERO external IO dependencies - only data structures,
//! the feed parser, business rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (CurrencyCode, RateRecord, DateRange) and the feed parser
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `error/` - Domain, store and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    CurrencyCode, DateRange, DiagnosticKind, ParseDiagnostic, ParsedFeed, ParsedRow, RateRecord,
    parse_feed, parse_iso_date,
};
pub use dto::*;
pub use error::{AppError, DomainError, StoreError};
pub use ports::{FeedSource, FetchError, RateStore};
