//! Currency code domain type.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::error::DomainError;

/// Length of the ISO-style codes published in the fixing feed.
pub const CURRENCY_CODE_LEN: usize = 3;

/// Uppercase alphabetic currency identifier (e.g. `EUR`, `USD`).
///
/// Input is trimmed and uppercased, so `" eur"` and `"EUR"` are the same code.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "EUR")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parses and normalizes a currency code.
    ///
    /// # Validation
    /// - Exactly three ASCII letters after trimming
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed.len() != CURRENCY_CODE_LEN
            || !trimmed.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(DomainError::InvalidCurrencyCode(raw.to_string()));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl AsRef<str> for CurrencyCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_is_normalized() {
        let code = CurrencyCode::parse(" eur ").unwrap();
        assert_eq!(code.as_str(), "EUR");
    }

    #[test]
    fn test_invalid_codes_rejected() {
        for raw in ["", "EU", "EURO", "E1R", "€UR"] {
            let result = CurrencyCode::parse(raw);
            assert!(
                matches!(result, Err(DomainError::InvalidCurrencyCode(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_serde_uses_plain_string() {
        let code = CurrencyCode::parse("usd").unwrap();
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"USD\"");

        let back: CurrencyCode = serde_json::from_str("\"gbp\"").unwrap();
        assert_eq!(back.as_str(), "GBP");
        assert!(serde_json::from_str::<CurrencyCode>("\"12\"").is_err());
    }
}
