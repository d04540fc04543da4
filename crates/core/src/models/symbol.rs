use serde::{Deserialize, Serialize};

/// One autocomplete suggestion for a free-text company query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolSuggestion {
    /// Provider symbol, ready to be used as a ticker (e.g. "AAPL.US")
    pub symbol: String,
    pub name: String,
    pub exchange: String,
    /// Instrument type as reported by the provider ("Common Stock", "ETF", ...)
    pub kind: String,
}
