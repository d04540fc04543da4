use crate::errors::CoreError;
use crate::models::analytics::{PortfolioTotals, PositionValuation, PriceSource};
use crate::models::position::Currency;
use crate::models::price::{DailyPriceRecord, LatestQuote};
use crate::models::request::ResolvedPosition;
use crate::services::price_history;

/// Turns an entered position into shares and a current value.
///
/// Works on already-fetched prices only.
pub struct ValuationService;

impl ValuationService {
    pub fn new() -> Self {
        Self
    }

    /// Value one position.
    ///
    /// 1. Purchase close: first trading day on or after the purchase date.
    /// 2. Amount in USD: EUR is multiplied by `usd_per_eur`; without a rate the
    ///    EUR amount is taken as USD (degraded mode, not an error).
    /// 3. Shares = amount USD / purchase close.
    /// 4. Current close: the live quote, else the last record of the history.
    pub fn value_position(
        &self,
        resolved: &ResolvedPosition,
        history: &[DailyPriceRecord],
        quote: Option<&LatestQuote>,
        usd_per_eur: Option<f64>,
    ) -> Result<PositionValuation, CoreError> {
        let position = &resolved.position;
        let symbol = resolved.symbol.as_str();

        let purchase = price_history::close_on_or_after(symbol, history, position.purchase_date)?;
        let purchase_close = checked_price(symbol, purchase.close)?;

        let amount_usd = to_usd(position.amount, position.currency, usd_per_eur);
        let shares = amount_usd / purchase_close;

        let live = quote
            .and_then(|q| q.close)
            .filter(|c| c.is_finite() && *c > 0.0);
        let (current_close, current_price_source) = match live {
            Some(close) => (close, PriceSource::LiveQuote),
            None => {
                let last = price_history::last_record(history).ok_or_else(|| {
                    CoreError::NoTradingDay {
                        symbol: symbol.to_string(),
                        date: position.purchase_date.to_string(),
                    }
                })?;
                (checked_price(symbol, last.close)?, PriceSource::LastHistoricalClose)
            }
        };

        let current_value_usd = shares * current_close;
        let gain_usd = current_value_usd - amount_usd;

        Ok(PositionValuation {
            position_id: position.id,
            symbol: symbol.to_string(),
            amount: position.amount,
            currency: position.currency,
            amount_usd,
            requested_date: position.purchase_date,
            purchase_date_used: purchase.date,
            purchase_close,
            shares,
            current_close,
            current_price_source,
            current_value_usd,
            gain_usd,
            return_pct: pct(gain_usd, amount_usd),
        })
    }

    /// Sum valuations into portfolio totals.
    ///
    /// `invested_eur_original` adds up only EUR-entered amounts, unconverted.
    pub fn totals(&self, valuations: &[PositionValuation], usd_per_eur: Option<f64>) -> PortfolioTotals {
        let invested_usd: f64 = valuations.iter().map(|v| v.amount_usd).sum();
        let invested_eur_original: f64 = valuations
            .iter()
            .filter(|v| v.currency == Currency::EUR)
            .map(|v| v.amount)
            .sum();
        let current_value_usd: f64 = valuations.iter().map(|v| v.current_value_usd).sum();
        let gain_usd = current_value_usd - invested_usd;

        PortfolioTotals {
            invested_usd,
            invested_eur_original,
            current_value_usd,
            current_value_eur: usd_per_eur.map(|rate| current_value_usd / rate),
            gain_usd,
            return_pct: pct(gain_usd, invested_usd),
        }
    }
}

impl Default for ValuationService {
    fn default() -> Self {
        Self::new()
    }
}

fn to_usd(amount: f64, currency: Currency, usd_per_eur: Option<f64>) -> f64 {
    match (currency, usd_per_eur) {
        (Currency::EUR, Some(rate)) => amount * rate,
        _ => amount,
    }
}

fn checked_price(symbol: &str, price: f64) -> Result<f64, CoreError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(CoreError::InvalidPrice {
            symbol: symbol.to_string(),
            price,
        });
    }
    Ok(price)
}

fn pct(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        (part / whole) * 100.0
    } else {
        0.0
    }
}
