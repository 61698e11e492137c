//! Outbound adapters (driven side).

mod cnb;

pub use cnb::{CnbFeedClient, DEFAULT_FEED_URL, feed_date};
