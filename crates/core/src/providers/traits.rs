use async_trait::async_trait;
use std::collections::HashMap;

use crate::errors::CoreError;
use crate::models::price::{DailyPriceRecord, LatestQuote};
use crate::models::symbol::SymbolSuggestion;

/// Source of daily histories, live quotes and symbol search.
///
/// The engine never calls a provider itself; `MarketDataService` fetches
/// everything up front and hands the engine plain values.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Exchange suffix this provider expects on bare tickers, if any.
    fn exchange_suffix(&self) -> Option<&str> {
        None
    }

    /// Full daily history of `symbol`, ascending by date.
    async fn fetch_history(&self, symbol: &str) -> Result<Vec<DailyPriceRecord>, CoreError>;

    /// Latest quotes for several symbols. Symbols the provider has no quote
    /// for are simply absent from the map.
    async fn fetch_latest_quotes(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, LatestQuote>, CoreError>;

    /// Autocomplete suggestions for a free-text company name.
    async fn search_symbols(&self, query: &str) -> Result<Vec<SymbolSuggestion>, CoreError>;
}

/// Source of the current EUR → USD exchange rate.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait ExchangeRateProvider: Send + Sync {
    fn name(&self) -> &str;

    /// USD per 1 EUR.
    async fn fetch_usd_per_eur(&self) -> Result<f64, CoreError>;
}
