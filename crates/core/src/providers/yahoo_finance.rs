use async_trait::async_trait;
use chrono::NaiveDate;
use log::warn;
use std::collections::HashMap;
use time::OffsetDateTime;

use crate::errors::CoreError;
use crate::models::price::{DailyPriceRecord, LatestQuote};
use crate::models::symbol::SymbolSuggestion;
use super::traits::MarketDataProvider;

const PROVIDER: &str = "Yahoo Finance";

/// Yahoo Finance API provider for stock/ETF histories, quotes and search.
///
/// - **Free**: No API key required.
/// - **No strict rate limits** (unofficial public API).
/// - **Symbols**: plain tickers for US listings ("AAPL"), suffixed otherwise ("SAP.DE"),
///   so no exchange suffix is appended.
///
/// Uses the `yahoo_finance_api` crate which wraps Yahoo Finance's
/// public endpoints.
///
/// **Note**: Not WASM-compatible (uses native reqwest/tokio).
pub struct YahooFinanceProvider {
    connector: yahoo_finance_api::YahooConnector,
}

impl YahooFinanceProvider {
    pub fn new() -> Result<Self, CoreError> {
        let connector = yahoo_finance_api::YahooConnector::new()
            .map_err(|e| api_error(format!("Failed to create connector: {e}")))?;
        Ok(Self { connector })
    }

    /// Convert a unix timestamp (seconds) to `chrono::NaiveDate`.
    fn timestamp_to_naive_date(ts: i64) -> Option<NaiveDate> {
        chrono::DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive())
    }
}

fn api_error(message: String) -> CoreError {
    CoreError::Api {
        provider: PROVIDER.into(),
        message,
    }
}

#[async_trait]
impl MarketDataProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn fetch_history(&self, symbol: &str) -> Result<Vec<DailyPriceRecord>, CoreError> {
        let start = OffsetDateTime::from_unix_timestamp(0)
            .map_err(|e| api_error(format!("Invalid start time: {e}")))?;
        let end = OffsetDateTime::now_utc();

        let resp = self
            .connector
            .get_quote_history(symbol, start, end)
            .await
            .map_err(|e| api_error(format!("Failed to fetch history for {symbol}: {e}")))?;

        let quotes = resp
            .quotes()
            .map_err(|e| api_error(format!("Failed to parse quotes for {symbol}: {e}")))?;

        let mut records: Vec<DailyPriceRecord> = quotes
            .iter()
            .filter_map(|q| {
                let date = Self::timestamp_to_naive_date(q.timestamp)?;
                Some(DailyPriceRecord {
                    date,
                    open: q.open,
                    high: q.high,
                    low: q.low,
                    close: q.close,
                    volume: Some(q.volume as f64),
                })
            })
            .collect();

        records.sort_by_key(|r| r.date);
        Ok(records)
    }

    async fn fetch_latest_quotes(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, LatestQuote>, CoreError> {
        let mut quotes = HashMap::new();
        for symbol in symbols {
            let resp = match self.connector.get_latest_quotes(symbol, "1d").await {
                Ok(resp) => resp,
                Err(e) => {
                    warn!("{PROVIDER}: no latest quote for {symbol}: {e}");
                    continue;
                }
            };
            if let Ok(quote) = resp.last_quote() {
                let raw = serde_json::json!({
                    "timestamp": quote.timestamp,
                    "open": quote.open,
                    "high": quote.high,
                    "low": quote.low,
                    "close": quote.close,
                    "volume": quote.volume,
                });
                quotes.insert(
                    symbol.clone(),
                    LatestQuote {
                        symbol: symbol.clone(),
                        close: Some(quote.close),
                        raw,
                    },
                );
            }
        }
        Ok(quotes)
    }

    async fn search_symbols(&self, query: &str) -> Result<Vec<SymbolSuggestion>, CoreError> {
        let resp = self
            .connector
            .search_ticker(query.trim())
            .await
            .map_err(|e| api_error(format!("Search for '{query}' failed: {e}")))?;

        Ok(resp
            .quotes
            .into_iter()
            .map(|item| SymbolSuggestion {
                symbol: item.symbol,
                name: item.short_name,
                exchange: item.exchange,
                kind: item.quote_type,
            })
            .collect())
    }
}
