//! SQLite repository adapter.

use std::collections::BTreeSet;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use fxsync_types::domain::validate_rate;
use fxsync_types::{CurrencyCode, DateRange, RateRecord, RateStore, StoreError};

use crate::types::SqliteRateRow;

const RATE_COLUMNS: &str = "currency_code, rate_date, rate, updated_at";

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite repository implementation.
pub struct SqliteRepo {
    pool: SqlitePool,
}

impl SqliteRepo {
    /// Creates a new SQLite repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            let path = path.split('?').next().unwrap_or(path);
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // Every in-memory connection is its own database, so keep exactly one alive.
        let pool = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new().connect_with(options).await?
        };

        let repo = Self { pool };
        repo.create_schema().await?;
        Ok(repo)
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the database schema (for testing with existing pool).
    pub async fn create_schema(&self) -> Result<(), StoreError> {
        let ddl = include_str!("../migrations/0001_create_exchange_rates.sql");
        sqlx::query(ddl)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    /// Closes every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Store implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl RateStore for SqliteRepo {
    async fn upsert_rate(
        &self,
        code: &CurrencyCode,
        date: NaiveDate,
        rate: f64,
    ) -> Result<RateRecord, StoreError> {
        let rate = validate_rate(rate)?;
        let now = chrono::Utc::now().to_rfc3339();

        let row: SqliteRateRow = sqlx::query_as(&format!(
            r#"INSERT INTO exchange_rates ({RATE_COLUMNS}) VALUES (?, ?, ?, ?)
               ON CONFLICT (currency_code, rate_date)
               DO UPDATE SET rate = excluded.rate, updated_at = excluded.updated_at
               RETURNING {RATE_COLUMNS}"#
        ))
        .bind(code.as_str())
        .bind(date.to_string())
        .bind(rate)
        .bind(&now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        tracing::debug!(code = %code, %date, rate, "rate upserted");
        row.into_domain()
    }

    async fn query_range(
        &self,
        range: DateRange,
        codes: &BTreeSet<CurrencyCode>,
    ) -> Result<Vec<RateRecord>, StoreError> {
        if codes.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {RATE_COLUMNS} FROM exchange_rates WHERE rate_date >= "
        ));
        query
            .push_bind(range.start().to_string())
            .push(" AND rate_date <= ")
            .push_bind(range.end().to_string())
            .push(" AND currency_code IN (");
        let mut separated = query.separated(", ");
        for code in codes {
            separated.push_bind(code.as_str().to_string());
        }
        separated.push_unseparated(")");

        let rows: Vec<SqliteRateRow> = query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        rows.into_iter().map(SqliteRateRow::into_domain).collect()
    }

    async fn find_all(&self) -> Result<Vec<RateRecord>, StoreError> {
        let rows: Vec<SqliteRateRow> = sqlx::query_as(&format!(
            "SELECT {RATE_COLUMNS} FROM exchange_rates ORDER BY rate_date, currency_code"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        rows.into_iter().map(SqliteRateRow::into_domain).collect()
    }
}
