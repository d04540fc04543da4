use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::month::YearMonth;

/// One daily OHLCV record as delivered by a market data provider.
///
/// Histories are ordered ascending by date; weekends and holidays simply
/// have no record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPriceRecord {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: Option<f64>,
}

impl DailyPriceRecord {
    /// Record where every price field equals `close` (handy for tests and
    /// providers that only deliver closes).
    pub fn from_close(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: None,
        }
    }
}

/// The last available close of a calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyClose {
    pub month: YearMonth,
    pub date: NaiveDate,
    pub close: f64,
}

/// A live quote. `close` is `None` when the provider answered without a
/// usable price (e.g. `"NA"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestQuote {
    pub symbol: String,
    pub close: Option<f64>,
    /// Provider payload, kept verbatim for display.
    #[serde(default)]
    pub raw: serde_json::Value,
}

/// Session-scoped cache of fetched price histories, keyed by normalised symbol.
///
/// Nothing is persisted: the cache lives as long as the session object and
/// only saves refetching the same history when the user recalculates.
#[derive(Debug, Clone, Default)]
pub struct PriceCache {
    entries: HashMap<String, Vec<DailyPriceRecord>>,
    /// Day on which each symbol's history was fetched; older entries are stale.
    fetched_on: HashMap<String, NaiveDate>,
}

impl PriceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached history for `symbol` if it was fetched on `today`.
    pub fn get_history(&self, symbol: &str, today: NaiveDate) -> Option<&[DailyPriceRecord]> {
        let key = symbol.to_uppercase();
        if self.fetched_on.get(&key) != Some(&today) {
            return None;
        }
        self.entries.get(&key).map(Vec::as_slice)
    }

    /// Store a history, sorting it ascending by date and dropping duplicate days
    /// (the later record for a day wins).
    pub fn set_history(&mut self, symbol: &str, mut records: Vec<DailyPriceRecord>, today: NaiveDate) {
        let key = symbol.to_uppercase();
        records.sort_by_key(|r| r.date);
        records.reverse();
        records.dedup_by_key(|r| r.date);
        records.reverse();
        self.entries.insert(key.clone(), records);
        self.fetched_on.insert(key, today);
    }

    /// Number of distinct symbols cached.
    pub fn symbol_count(&self) -> usize {
        self.entries.len()
    }

    /// Total number of cached daily records across all symbols.
    pub fn total_entries(&self) -> usize {
        self.entries.values().map(|v| v.len()).sum()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.fetched_on.clear();
    }
}
