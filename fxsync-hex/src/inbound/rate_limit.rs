//! Rate limiting middleware using Governor.
//!
//! Every sync request hits the upstream feed, so sync routes get a per-client
//! token bucket. Clients are identified by their peer address. `X-Forwarded-For`
//! is honoured only when the server sits behind a trusted reverse proxy.

use axum::{
    Json,
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use serde_json::json;
use std::{
    net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr},
    num::NonZeroU32,
    sync::Arc,
    time::Duration,
};

/// Header set by a reverse proxy in front of the server.
const FORWARDED_FOR: &str = "x-forwarded-for";

/// Tracked clients before idle buckets are evicted.
const DEFAULT_PRUNE_THRESHOLD: usize = 10_000;

/// Bucket used when no client address is known.
const UNKNOWN_CLIENT: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// Rate limiter state shared across requests.
pub struct RateLimiterState {
    /// Per-client token buckets
    limiter: DefaultKeyedRateLimiter<IpAddr>,
    /// Whether `X-Forwarded-For` comes from a trusted proxy
    trust_forwarded_for: bool,
    prune_threshold: usize,
}

impl Default for RateLimiterState {
    fn default() -> Self {
        Self::new(30, Duration::from_secs(60))
    }
}

impl RateLimiterState {
    /// Creates a new rate limiter state.
    ///
    /// # Arguments
    /// * `requests` - Burst size; zero is treated as one
    /// * `period` - Time to replenish one request
    pub fn new(requests: u32, period: Duration) -> Self {
        let burst = NonZeroU32::new(requests).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::with_period(period)
            .unwrap_or_else(|| Quota::per_minute(burst))
            .allow_burst(burst);

        Self {
            limiter: RateLimiter::keyed(quota),
            trust_forwarded_for: false,
            prune_threshold: DEFAULT_PRUNE_THRESHOLD,
        }
    }

    /// Keys clients on the last `X-Forwarded-For` hop instead of the peer address.
    pub fn trust_forwarded_for(mut self, trust: bool) -> Self {
        self.trust_forwarded_for = trust;
        self
    }

    /// Sets how many clients are tracked before idle buckets are evicted.
    pub fn with_prune_threshold(mut self, threshold: usize) -> Self {
        self.prune_threshold = threshold.max(1);
        self
    }

    /// Returns true if the request is allowed, false if rate limited.
    pub fn check(&self, client: IpAddr) -> bool {
        if self.limiter.len() >= self.prune_threshold {
            self.prune();
        }
        self.limiter.check_key(&bucket_key(client)).is_ok()
    }

    /// Drops buckets that have refilled completely.
    pub fn prune(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }

    fn client_ip(&self, request: &Request<Body>) -> IpAddr {
        let forwarded = self
            .trust_forwarded_for
            .then(|| forwarded_client(request))
            .flatten();

        forwarded
            .or_else(|| {
                request
                    .extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip())
            })
            .unwrap_or(UNKNOWN_CLIENT)
    }
}

/// The hop appended by the proxy, i.e. the last `X-Forwarded-For` entry.
fn forwarded_client(request: &Request<Body>) -> Option<IpAddr> {
    request
        .headers()
        .get(FORWARDED_FOR)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.rsplit(',').next())
        .and_then(|s| s.trim().parse().ok())
}

/// IPv6 clients share a bucket per /64.
fn bucket_key(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V4(_) => ip,
        IpAddr::V6(v6) => {
            let prefix = u128::from(v6) & (u128::MAX << 64);
            IpAddr::V6(Ipv6Addr::from(prefix))
        }
    }
}

/// Rate limiting middleware.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiterState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let client = limiter.client_ip(&request);

    if !limiter.check(client) {
        tracing::warn!(client = %client, path = %request.uri().path(), "sync rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "error": "Rate limit exceeded. Please try again later.",
                "retry_after_seconds": 60
            })),
        )
            .into_response();
    }

    next.run(request).await
}
