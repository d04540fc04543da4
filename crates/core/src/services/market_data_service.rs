use chrono::NaiveDate;
use futures::future::try_join_all;
use log::{debug, warn};
use std::collections::HashMap;

use crate::errors::CoreError;
use crate::models::price::{DailyPriceRecord, LatestQuote, PriceCache};
use crate::models::request::MarketSnapshot;
use crate::models::symbol::SymbolSuggestion;
use crate::providers::traits::{ExchangeRateProvider, MarketDataProvider};

/// Fetches everything one calculation needs, before the engine runs.
///
/// Histories, quotes and the FX rate are independent requests and are issued
/// concurrently, then joined into a [`MarketSnapshot`].
///
/// Failure policy:
/// - **History**: required — any failure aborts the snapshot.
/// - **Quotes**: optional — on failure valuations use the last historical close.
/// - **FX rate**: optional — on failure EUR amounts are taken as USD.
pub struct MarketDataService {
    market: Box<dyn MarketDataProvider>,
    fx: Option<Box<dyn ExchangeRateProvider>>,
}

impl MarketDataService {
    pub fn new(market: Box<dyn MarketDataProvider>, fx: Option<Box<dyn ExchangeRateProvider>>) -> Self {
        Self { market, fx }
    }

    pub fn provider_name(&self) -> &str {
        self.market.name()
    }

    pub fn exchange_suffix(&self) -> Option<&str> {
        self.market.exchange_suffix()
    }

    /// Load histories (from `cache` when fetched today), quotes and the FX rate.
    pub async fn load_snapshot(
        &self,
        cache: &mut PriceCache,
        symbols: &[String],
        today: NaiveDate,
    ) -> Result<MarketSnapshot, CoreError> {
        let mut histories: HashMap<String, Vec<DailyPriceRecord>> = HashMap::new();
        let mut missing: Vec<&String> = Vec::new();
        for symbol in symbols {
            match cache.get_history(symbol, today) {
                Some(history) => {
                    histories.insert(symbol.clone(), history.to_vec());
                }
                None => missing.push(symbol),
            }
        }
        debug!(
            "{}: {} histories cached, {} to fetch",
            self.market.name(),
            histories.len(),
            missing.len()
        );

        let history_requests = try_join_all(missing.iter().map(|symbol| async move {
            let history = self.market.fetch_history(symbol).await?;
            Ok::<_, CoreError>(((*symbol).clone(), history))
        }));

        let (fetched, quotes, usd_per_eur) = futures::join!(
            history_requests,
            self.load_quotes(symbols),
            self.load_fx_rate()
        );

        for (symbol, history) in fetched? {
            cache.set_history(&symbol, history, today);
            if let Some(sorted) = cache.get_history(&symbol, today) {
                histories.insert(symbol, sorted.to_vec());
            }
        }

        Ok(MarketSnapshot {
            histories,
            quotes,
            usd_per_eur,
        })
    }

    /// Autocomplete suggestions. A blank query returns nothing without a request.
    pub async fn search_symbols(&self, query: &str) -> Result<Vec<SymbolSuggestion>, CoreError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        self.market.search_symbols(query).await
    }

    async fn load_quotes(&self, symbols: &[String]) -> HashMap<String, LatestQuote> {
        match self.market.fetch_latest_quotes(symbols).await {
            Ok(quotes) => quotes,
            Err(e) => {
                warn!(
                    "{}: latest quotes unavailable, falling back to last close: {e}",
                    self.market.name()
                );
                HashMap::new()
            }
        }
    }

    async fn load_fx_rate(&self) -> Option<f64> {
        let fx = self.fx.as_ref()?;
        match fx.fetch_usd_per_eur().await {
            Ok(rate) => Some(rate),
            Err(e) => {
                warn!("{}: EUR/USD rate unavailable, EUR amounts taken as USD: {e}", fx.name());
                None
            }
        }
    }
}
