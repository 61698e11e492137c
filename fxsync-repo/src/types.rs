//! Database row types for SQLite and PostgreSQL.

use sqlx::FromRow;

use fxsync_types::{CurrencyCode, RateRecord, StoreError};

// ─────────────────────────────────────────────────────────────────────────────
// Database row structs (derive FromRow for automatic mapping)
// ─────────────────────────────────────────────────────────────────────────────

/// Rate row from SQLite (dates and timestamps stored as TEXT).
#[cfg(feature = "sqlite")]
#[derive(FromRow)]
pub struct SqliteRateRow {
    pub currency_code: String,
    pub rate_date: String,
    pub rate: f64,
    pub updated_at: String,
}

/// Rate row from PostgreSQL.
#[cfg(feature = "postgres")]
#[derive(FromRow)]
pub struct PgRateRow {
    pub currency_code: String,
    pub rate_date: chrono::NaiveDate,
    pub rate: f64,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Domain conversion
// ─────────────────────────────────────────────────────────────────────────────

fn parse_code(s: &str) -> Result<CurrencyCode, StoreError> {
    CurrencyCode::parse(s).map_err(StoreError::Domain)
}

#[cfg(feature = "sqlite")]
impl SqliteRateRow {
    /// Convert database row to domain RateRecord.
    pub fn into_domain(self) -> Result<RateRecord, StoreError> {
        let code = parse_code(&self.currency_code)?;
        let date = fxsync_types::parse_iso_date(&self.rate_date)
            .map_err(|e| StoreError::Database(e.to_string()))?;
        let updated_at = chrono::DateTime::parse_from_rfc3339(&self.updated_at)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .with_timezone(&chrono::Utc);

        Ok(RateRecord::from_parts(code, date, self.rate, updated_at))
    }
}

#[cfg(feature = "postgres")]
impl PgRateRow {
    /// Convert database row to domain RateRecord.
    pub fn into_domain(self) -> Result<RateRecord, StoreError> {
        let code = parse_code(&self.currency_code)?;
        Ok(RateRecord::from_parts(
            code,
            self.rate_date,
            self.rate,
            self.updated_at,
        ))
    }
}
