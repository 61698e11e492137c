//! PostgreSQL repository adapter.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;

use fxsync_types::domain::validate_rate;
use fxsync_types::{CurrencyCode, DateRange, RateRecord, RateStore, StoreError};

use crate::types::PgRateRow;

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL Repository
// ─────────────────────────────────────────────────────────────────────────────

/// PostgreSQL repository backed by a connection pool.
pub struct PostgresRepo {
    pool: PgPool,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &PgPool, sql: &str, name: &str) -> Result<(), anyhow::Error> {
    for statement in sql.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
        }
    }
    Ok(())
}

/// Runs all database migrations.
async fn run_migrations(pool: &PgPool) -> Result<(), anyhow::Error> {
    execute_migration(
        pool,
        include_str!("../migrations/0001_create_exchange_rates_pg.sql"),
        "0001",
    )
    .await
}

impl PostgresRepo {
    /// Creates a new PostgreSQL repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the database schema (for testing with existing pool).
    pub async fn create_schema(&self) -> Result<(), StoreError> {
        run_migrations(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))
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
impl RateStore for PostgresRepo {
    async fn upsert_rate(
        &self,
        code: &CurrencyCode,
        date: NaiveDate,
        rate: f64,
    ) -> Result<RateRecord, StoreError> {
        let rate = validate_rate(rate)?;

        let row: PgRateRow = sqlx::query_as(
            r#"INSERT INTO exchange_rates (currency_code, rate_date, rate, updated_at)
               VALUES ($1, $2, $3, $4)
               ON CONFLICT (currency_code, rate_date)
               DO UPDATE SET rate = EXCLUDED.rate, updated_at = EXCLUDED.updated_at
               RETURNING currency_code, rate_date, rate, updated_at"#,
        )
        .bind(code.as_str())
        .bind(date)
        .bind(rate)
        .bind(Utc::now())
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
        let codes: Vec<String> = codes.iter().map(|c| c.as_str().to_string()).collect();

        let rows: Vec<PgRateRow> = sqlx::query_as(
            r#"SELECT currency_code, rate_date, rate, updated_at FROM exchange_rates
               WHERE rate_date BETWEEN $1 AND $2 AND currency_code = ANY($3)"#,
        )
        .bind(range.start())
        .bind(range.end())
        .bind(&codes)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        rows.into_iter().map(PgRateRow::into_domain).collect()
    }

    async fn find_all(&self) -> Result<Vec<RateRecord>, StoreError> {
        let rows: Vec<PgRateRow> = sqlx::query_as(
            r#"SELECT currency_code, rate_date, rate, updated_at FROM exchange_rates
               ORDER BY rate_date, currency_code"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        rows.into_iter().map(PgRateRow::into_domain).collect()
    }
}
