use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use crate::errors::CoreError;
use super::traits::ExchangeRateProvider;

const BASE_URL: &str = "https://api.frankfurter.dev/v1";

/// Frankfurter API provider for the EUR → USD exchange rate.
///
/// - **Free**: No API key, no rate limits, open-source.
/// - **Source**: European Central Bank (ECB) reference rates.
/// - **Endpoint**: `/latest?base=EUR&symbols=USD`
///
/// Only the latest rate is used: every conversion in a calculation shares
/// one current rate, historical rates are not modelled.
pub struct FrankfurterProvider {
    client: Client,
}

impl FrankfurterProvider {
    pub fn new() -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(30));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
        }
    }
}

impl Default for FrankfurterProvider {
    fn default() -> Self {
        Self::new()
    }
}

// ── Frankfurter API response types ──────────────────────────────────

#[derive(Deserialize)]
struct RatesResponse {
    rates: HashMap<String, f64>,
}

/// Extract the USD rate from a `/latest?base=EUR` response body.
pub fn parse_usd_rate(body: &str) -> Result<f64, CoreError> {
    let resp: RatesResponse = serde_json::from_str(body).map_err(|e| CoreError::Api {
        provider: "Frankfurter".into(),
        message: format!("Failed to parse EUR/USD response: {e}"),
    })?;

    let rate = resp.rates.get("USD").copied().ok_or_else(|| CoreError::Api {
        provider: "Frankfurter".into(),
        message: "No rate found for EUR → USD".into(),
    })?;

    if !rate.is_finite() || rate <= 0.0 {
        return Err(CoreError::Api {
            provider: "Frankfurter".into(),
            message: format!("Invalid EUR → USD rate: {rate}"),
        });
    }
    Ok(rate)
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl ExchangeRateProvider for FrankfurterProvider {
    fn name(&self) -> &str {
        "Frankfurter"
    }

    async fn fetch_usd_per_eur(&self) -> Result<f64, CoreError> {
        let url = format!("{BASE_URL}/latest?base=EUR&symbols=USD");
        let body = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_usd_rate(&body)
    }
}
