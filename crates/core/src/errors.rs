use thiserror::Error;

/// Unified error type for the entire portfolio-hindsight-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Calculation ─────────────────────────────────────────────────
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("No trading day for {symbol} on or after {date}")]
    NoTradingDay { symbol: String, date: String },

    #[error("Invalid price for {symbol}: {price}")]
    InvalidPrice { symbol: String, price: f64 },

    // ── Business Logic ──────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Position not found: {0}")]
    PositionNotFound(u64),

    // ── API / Network ───────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("No provider configured for {0}")]
    NoProvider(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest errors carry the full URL, including `api_token=...`.
        let msg = e.to_string();
        CoreError::Network(sanitize_url_message(&msg))
    }
}

/// Strip everything after the first `?` of a message so query-string secrets
/// never reach logs or the UI.
pub fn sanitize_url_message(msg: &str) -> String {
    match msg.find('?') {
        Some(idx) => format!("{}?<query redacted>", &msg[..idx]),
        None => msg.to_string(),
    }
}
