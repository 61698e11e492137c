//! HTTP Inbound Adapter
//!
//! Axum-based HTTP server and the daily timer, both driving the application layer.

mod handlers;
mod rate_limit;
mod scheduler;
mod server;

pub use handlers::{ApiError, AppState};
pub use rate_limit::RateLimiterState;
pub use scheduler::{DailySync, delay_until};
pub use server::HttpServer;
