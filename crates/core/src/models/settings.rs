use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// User-configurable settings for a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Optional API keys for providers that require them.
    /// Keys: provider name (e.g., "eodhd").
    /// Values: the API key string.
    pub api_keys: HashMap<String, String>,

    /// Exchange code appended to bare tickers for providers that need one
    /// (e.g. "US" turns "AAPL" into "AAPL.US").
    pub exchange_code: String,

    /// Month-over-month decline, in percent, at which a month counts as a drop.
    pub drop_threshold_pct: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_keys: HashMap::new(),
            exchange_code: "US".to_string(),
            drop_threshold_pct: 10.0,
        }
    }
}
