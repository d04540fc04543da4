use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::price::{DailyPriceRecord, LatestQuote};
use crate::models::symbol::SymbolSuggestion;
use super::traits::MarketDataProvider;

const BASE_URL: &str = "https://eodhd.com/api";
const SEARCH_LIMIT: &str = "10";
const PROVIDER: &str = "EODHD";

/// EOD Historical Data provider for stock/ETF histories, quotes and search.
///
/// - **Requires**: API key (set via settings as "eodhd").
/// - **Symbols**: `TICKER.EXCHANGE` (e.g. "AAPL.US", "SAP.XETRA").
/// - **Endpoints**: `/eod/{symbol}`, `/real-time/{symbol}?s=...`, `/search/{query}`
///
/// Prices are in the listing's currency; amounts are converted to USD
/// before shares are bought, so USD listings are assumed.
pub struct EodhdProvider {
    client: Client,
    api_key: String,
    exchange_code: String,
}

impl EodhdProvider {
    pub fn new(api_key: String, exchange_code: impl Into<String>) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(30));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            api_key,
            exchange_code: exchange_code.into().to_uppercase(),
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, CoreError> {
        let mut url = Url::parse(BASE_URL).map_err(|e| api_error(format!("Bad base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| api_error("Base URL cannot take path segments".into()))?
            .extend(segments);
        Ok(url)
    }

    async fn get_text(&self, url: Url, extra: &[(&str, &str)]) -> Result<String, CoreError> {
        let body = self
            .client
            .get(url)
            .query(&[("api_token", self.api_key.as_str()), ("fmt", "json")])
            .query(extra)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }
}

fn api_error(message: String) -> CoreError {
    CoreError::Api {
        provider: PROVIDER.into(),
        message,
    }
}

// ── EODHD API response types ────────────────────────────────────────

#[derive(Deserialize)]
struct EodRow {
    date: String,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    volume: Option<f64>,
}

#[derive(Deserialize)]
struct SearchRow {
    #[serde(rename = "Code")]
    code: String,
    #[serde(rename = "Exchange")]
    exchange: String,
    #[serde(rename = "Name", default)]
    name: String,
    #[serde(rename = "Type", default)]
    kind: String,
}

/// Parse an `/eod/{symbol}` body into records sorted by date.
///
/// Rows without a date or close are skipped; missing open/high/low default
/// to the close.
pub fn parse_history(symbol: &str, body: &str) -> Result<Vec<DailyPriceRecord>, CoreError> {
    let rows: Vec<EodRow> = serde_json::from_str(body)
        .map_err(|e| api_error(format!("Failed to parse history for {symbol}: {e}")))?;

    let mut records: Vec<DailyPriceRecord> = rows
        .into_iter()
        .filter_map(|row| {
            let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d").ok()?;
            let close = row.close?;
            Some(DailyPriceRecord {
                date,
                open: row.open.unwrap_or(close),
                high: row.high.unwrap_or(close),
                low: row.low.unwrap_or(close),
                close,
                volume: row.volume,
            })
        })
        .collect();

    records.sort_by_key(|r| r.date);
    Ok(records)
}

/// Parse a `/real-time` body. A single symbol comes back as an object,
/// several as an array. A non-numeric close (`"NA"`) yields `close: None`.
pub fn parse_quotes(body: &str) -> Result<HashMap<String, LatestQuote>, CoreError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| api_error(format!("Failed to parse quotes: {e}")))?;

    let items = match value {
        serde_json::Value::Array(items) => items,
        other @ serde_json::Value::Object(_) => vec![other],
        other => return Err(api_error(format!("Unexpected quote payload: {other}"))),
    };

    Ok(items
        .into_iter()
        .filter_map(|raw| {
            let symbol = raw.get("code")?.as_str()?.to_uppercase();
            let close = raw.get("close").and_then(serde_json::Value::as_f64);
            Some((symbol.clone(), LatestQuote { symbol, close, raw }))
        })
        .collect())
}

/// Parse a `/search/{query}` body into suggestions (`CODE.EXCHANGE`).
pub fn parse_search(body: &str) -> Result<Vec<SymbolSuggestion>, CoreError> {
    let rows: Vec<SearchRow> = serde_json::from_str(body)
        .map_err(|e| api_error(format!("Failed to parse search results: {e}")))?;

    Ok(rows
        .into_iter()
        .map(|row| SymbolSuggestion {
            symbol: format!("{}.{}", row.code, row.exchange).to_uppercase(),
            name: row.name,
            exchange: row.exchange,
            kind: row.kind,
        })
        .collect())
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl MarketDataProvider for EodhdProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn exchange_suffix(&self) -> Option<&str> {
        Some(self.exchange_code.as_str())
    }

    async fn fetch_history(&self, symbol: &str) -> Result<Vec<DailyPriceRecord>, CoreError> {
        let url = self.endpoint(&["eod", symbol])?;
        let body = self.get_text(url, &[("period", "d")]).await?;
        parse_history(symbol, &body)
    }

    async fn fetch_latest_quotes(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, LatestQuote>, CoreError> {
        let Some((first, rest)) = symbols.split_first() else {
            return Ok(HashMap::new());
        };
        let url = self.endpoint(&["real-time", first.as_str()])?;
        let others = rest.join(",");
        let extra: Vec<(&str, &str)> = if others.is_empty() {
            Vec::new()
        } else {
            vec![("s", others.as_str())]
        };
        let body = self.get_text(url, &extra).await?;
        parse_quotes(&body)
    }

    async fn search_symbols(&self, query: &str) -> Result<Vec<SymbolSuggestion>, CoreError> {
        let url = self.endpoint(&["search", query.trim()])?;
        let body = self.get_text(url, &[("limit", SEARCH_LIMIT)]).await?;
        parse_search(&body)
    }
}
