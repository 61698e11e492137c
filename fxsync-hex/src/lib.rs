//! # Fxsync Hex
//!
//! Application layer, feed client and HTTP adapter for the fixing rate service.
//!
//! ## Architecture
//!
//! - `sync` / `aggregate` - Engines (fetch -> parse -> upsert, and range statistics)
//! - `service` - Application service (validates input, orchestrates the engines)
//! - `outbound/` - CNB feed client (reqwest)
//! - `inbound/` - HTTP adapter (Axum server) and daily scheduler
//!
//! The service is generic over `S: RateStore` and `F: FeedSource`, allowing
//! different adapters to be injected.

pub mod aggregate;
pub mod inbound;
pub mod openapi;
pub mod outbound;
pub mod service;
pub mod sync;


pub use aggregate::AggregationEngine;
pub use service::RateService;
pub use sync::SyncEngine;
