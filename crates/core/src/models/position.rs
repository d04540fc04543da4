use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Currency a position's amount was entered in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    USD,
    EUR,
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Currency::USD => write!(f, "USD"),
            Currency::EUR => write!(f, "EUR"),
        }
    }
}

/// A position as typed into the input form. Any field may still be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionInput {
    pub id: u64,
    pub ticker: Option<String>,
    pub amount: Option<f64>,
    pub currency: Currency,
    pub purchase_date: Option<NaiveDate>,
}

impl PositionInput {
    pub fn new(
        id: u64,
        ticker: impl Into<String>,
        amount: f64,
        currency: Currency,
        purchase_date: NaiveDate,
    ) -> Self {
        Self {
            id,
            ticker: Some(ticker.into()),
            amount: Some(amount),
            currency,
            purchase_date: Some(purchase_date),
        }
    }

    /// Check that every field is present and the amount is usable.
    pub fn validate(&self) -> Result<Position, CoreError> {
        let ticker = self
            .ticker
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| CoreError::MissingField(format!("ticker (position {})", self.id)))?;

        let amount = self
            .amount
            .ok_or_else(|| CoreError::MissingField(format!("amount (position {})", self.id)))?;
        if !amount.is_finite() || amount <= 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Amount must be positive for position {} (got {amount})",
                self.id
            )));
        }

        let purchase_date = self
            .purchase_date
            .ok_or_else(|| CoreError::MissingField(format!("purchase date (position {})", self.id)))?;

        Ok(Position {
            id: self.id,
            ticker: ticker.to_string(),
            amount,
            currency: self.currency,
            purchase_date,
        })
    }
}

/// A validated purchase: `amount` of `currency` invested in `ticker` on `purchase_date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: u64,
    /// Ticker as the user typed it (trimmed). See [`normalize_ticker`].
    pub ticker: String,
    pub amount: f64,
    pub currency: Currency,
    pub purchase_date: NaiveDate,
}

/// Canonical provider symbol for a raw ticker: trimmed, uppercased and, when
/// `exchange_suffix` is given and the ticker has no suffix yet, `.SUFFIX` appended.
///
/// `normalize_ticker(" aapl ", Some("US"))` → `"AAPL.US"`;
/// `normalize_ticker("SAP.XETRA", Some("US"))` → `"SAP.XETRA"`.
pub fn normalize_ticker(raw: &str, exchange_suffix: Option<&str>) -> String {
    let ticker = raw.trim().to_uppercase();
    match exchange_suffix.map(str::trim).filter(|s| !s.is_empty()) {
        Some(suffix) if !ticker.contains('.') => {
            format!("{ticker}.{}", suffix.trim_start_matches('.').to_uppercase())
        }
        _ => ticker,
    }
}
