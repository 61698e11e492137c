//! Configuration loading from environment.

use std::env;
use std::time::Duration;

use chrono::NaiveTime;
use fxsync_hex::outbound::DEFAULT_FEED_URL;
use fxsync_hex::service::DEFAULT_MAX_SYNC_DAYS;

/// Application configuration.
#[derive(Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    /// Upstream daily fixing endpoint
    pub feed_url: String,
    pub fetch_timeout: Duration,
    /// Local time of the daily scheduled sync
    pub sync_at: NaiveTime,
    /// Per-client quota on the sync endpoints
    pub sync_rate_limit_per_minute: u32,
    /// Key the sync quota on `X-Forwarded-For` (only behind a reverse proxy)
    pub trust_forwarded_for: bool,
    /// Longest date range a single sync request may cover
    pub max_sync_range_days: usize,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let port = var("PORT").unwrap_or_else(|| "3000".to_string()).parse()?;

        let database_url = var("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let feed_url = var("CNB_FEED_URL").unwrap_or_else(|| DEFAULT_FEED_URL.to_string());

        let fetch_timeout = var("FETCH_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".to_string())
            .parse()
            .map(Duration::from_secs)
            .map_err(|e| anyhow::anyhow!("FETCH_TIMEOUT_SECS must be a whole number: {}", e))?;

        let sync_at = var("SYNC_AT").unwrap_or_else(|| "01:00".to_string());
        let sync_at = NaiveTime::parse_from_str(&sync_at, "%H:%M")
            .map_err(|_| anyhow::anyhow!("SYNC_AT must be HH:MM, got {:?}", sync_at))?;

        let sync_rate_limit_per_minute = var("SYNC_RATE_LIMIT_PER_MINUTE")
            .unwrap_or_else(|| "30".to_string())
            .parse()?;

        let trust_forwarded_for = var("TRUST_FORWARDED_FOR")
            .unwrap_or_else(|| "false".to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("TRUST_FORWARDED_FOR must be true or false"))?;

        let max_sync_range_days = match var("MAX_SYNC_RANGE_DAYS") {
            Some(raw) => raw.parse()?,
            None => DEFAULT_MAX_SYNC_DAYS,
        };
        anyhow::ensure!(max_sync_range_days > 0, "MAX_SYNC_RANGE_DAYS must be positive");

        Ok(Self {
            port,
            database_url,
            feed_url,
            fetch_timeout,
            sync_at,
            sync_rate_limit_per_minute,
            trust_forwarded_for,
            max_sync_range_days,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("DATABASE_URL", "sqlite://rates.db")]).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.feed_url, DEFAULT_FEED_URL);
        assert_eq!(config.fetch_timeout, Duration::from_secs(30));
        assert_eq!(config.sync_at, NaiveTime::from_hms_opt(1, 0, 0).unwrap());
        assert_eq!(config.sync_rate_limit_per_minute, 30);
        assert!(!config.trust_forwarded_for);
        assert_eq!(config.max_sync_range_days, 366);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("DATABASE_URL", "memory://"),
            ("PORT", "8080"),
            ("CNB_FEED_URL", "http://localhost:9000/daily.txt"),
            ("FETCH_TIMEOUT_SECS", "5"),
            ("SYNC_AT", "14:30"),
            ("SYNC_RATE_LIMIT_PER_MINUTE", "3"),
            ("TRUST_FORWARDED_FOR", "true"),
            ("MAX_SYNC_RANGE_DAYS", "31"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.feed_url, "http://localhost:9000/daily.txt");
        assert_eq!(config.fetch_timeout, Duration::from_secs(5));
        assert_eq!(config.sync_at, NaiveTime::from_hms_opt(14, 30, 0).unwrap());
        assert_eq!(config.sync_rate_limit_per_minute, 3);
        assert!(config.trust_forwarded_for);
        assert_eq!(config.max_sync_range_days, 31);
    }

    #[test]
    fn test_database_url_is_required() {
        let err = load(&[]).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn test_invalid_sync_time() {
        let err = load(&[("DATABASE_URL", "memory://"), ("SYNC_AT", "1am")]).unwrap_err();
        assert!(err.to_string().contains("SYNC_AT"));
    }

    #[test]
    fn test_invalid_range_limits() {
        let err = load(&[("DATABASE_URL", "memory://"), ("MAX_SYNC_RANGE_DAYS", "0")]).unwrap_err();
        assert!(err.to_string().contains("MAX_SYNC_RANGE_DAYS"));

        let err = load(&[("DATABASE_URL", "memory://"), ("TRUST_FORWARDED_FOR", "yes")]).unwrap_err();
        assert!(err.to_string().contains("TRUST_FORWARDED_FOR"));
    }
}
