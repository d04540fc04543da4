pub mod errors;
pub mod models;
pub mod providers;
pub mod services;

use log::info;
use models::{
    analytics::{AnalysisResult, Drop},
    position::PositionInput,
    price::PriceCache,
    request::{validate_threshold, AnalysisRequest},
    settings::Settings,
    symbol::SymbolSuggestion,
};
use providers::eodhd::EodhdProvider;
use providers::frankfurter::FrankfurterProvider;
use providers::traits::{ExchangeRateProvider, MarketDataProvider};
#[cfg(not(target_arch = "wasm32"))]
use providers::yahoo_finance::YahooFinanceProvider;
use services::{
    analytics_service::AnalyticsService, market_data_service::MarketDataService,
    position_service::PositionService,
};

use errors::CoreError;

/// Main entry point for the Portfolio Hindsight core library.
///
/// Holds one in-memory session: the positions being entered, the market data
/// providers, a cache of fetched histories and the result of the last
/// calculation. Nothing is persisted.
#[must_use]
pub struct PortfolioHindsight {
    settings: Settings,
    positions: Vec<PositionInput>,
    price_cache: PriceCache,
    market_data_service: MarketDataService,
    position_service: PositionService,
    analytics_service: AnalyticsService,
    last_result: Option<AnalysisResult>,
}

impl std::fmt::Debug for PortfolioHindsight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioHindsight")
            .field("positions", &self.positions.len())
            .field("provider", &self.market_data_service.provider_name())
            .field("cached_symbols", &self.price_cache.symbol_count())
            .field("has_result", &self.last_result.is_some())
            .finish()
    }
}

impl PortfolioHindsight {
    /// Create a session with the default providers for `settings`:
    /// EODHD when an "eodhd" API key is set, Yahoo Finance otherwise, and
    /// Frankfurter for the EUR/USD rate.
    pub fn new(settings: Settings) -> Result<Self, CoreError> {
        let market = default_market_provider(&settings)?;
        let fx: Box<dyn ExchangeRateProvider> = Box::new(FrankfurterProvider::new());
        Self::with_providers(settings, market, Some(fx))
    }

    /// Create a session with explicit providers (used by tests and embedders).
    pub fn with_providers(
        settings: Settings,
        market: Box<dyn MarketDataProvider>,
        fx: Option<Box<dyn ExchangeRateProvider>>,
    ) -> Result<Self, CoreError> {
        validate_threshold(settings.drop_threshold_pct)?;
        Ok(Self {
            settings,
            positions: Vec::new(),
            price_cache: PriceCache::new(),
            market_data_service: MarketDataService::new(market, fx),
            position_service: PositionService::new(),
            analytics_service: AnalyticsService::new(),
            last_result: None,
        })
    }

    // ── Position Management ─────────────────────────────────────────

    /// Add a position (possibly incomplete); returns its assigned id.
    pub fn add_position(&mut self, input: PositionInput) -> u64 {
        self.position_service.add_position(&mut self.positions, input)
    }

    /// Replace the position with `id`.
    pub fn update_position(&mut self, id: u64, input: PositionInput) -> Result<(), CoreError> {
        self.position_service
            .update_position(&mut self.positions, id, input)
    }

    /// Remove the position with `id`.
    pub fn remove_position(&mut self, id: u64) -> Result<PositionInput, CoreError> {
        self.position_service.remove_position(&mut self.positions, id)
    }

    /// Remove every position and the last result.
    pub fn clear_positions(&mut self) {
        self.positions.clear();
        self.last_result = None;
    }

    #[must_use]
    pub fn positions(&self) -> &[PositionInput] {
        &self.positions
    }

    // ── Calculation ─────────────────────────────────────────────────

    /// Validate the positions, fetch market data and run the analysis.
    ///
    /// On any error the previous result is cleared, so a failed attempt
    /// never leaves stale or mixed numbers behind.
    pub async fn calculate(&mut self) -> Result<&AnalysisResult, CoreError> {
        self.last_result = None;

        let request = AnalysisRequest::build(
            &self.positions,
            self.market_data_service.exchange_suffix(),
            self.settings.drop_threshold_pct,
        )?;

        let today = chrono::Utc::now().date_naive();
        let snapshot = self
            .market_data_service
            .load_snapshot(&mut self.price_cache, &request.symbols(), today)
            .await?;

        let result = self.analytics_service.analyze(&request, &snapshot)?;
        info!(
            "Calculated {} positions: value {:.2} USD over {} months",
            result.valuations.len(),
            result.totals.current_value_usd,
            result.monthly.len()
        );

        Ok(self.last_result.insert(result))
    }

    /// Result of the last successful calculation.
    #[must_use]
    pub fn last_result(&self) -> Option<&AnalysisResult> {
        self.last_result.as_ref()
    }

    /// Drops of the last monthly series at another threshold.
    /// Empty when nothing has been calculated yet.
    pub fn drops_for_threshold(&self, threshold_pct: f64) -> Result<Vec<Drop>, CoreError> {
        validate_threshold(threshold_pct)?;
        Ok(self
            .last_result
            .as_ref()
            .map(|r| self.analytics_service.drops_for_threshold(&r.monthly, threshold_pct))
            .unwrap_or_default())
    }

    /// Export the last result as pretty JSON.
    pub fn result_to_json(&self) -> Result<Option<String>, CoreError> {
        self.last_result
            .as_ref()
            .map(|r| serde_json::to_string_pretty(r).map_err(CoreError::from))
            .transpose()
    }

    // ── Symbol Search ───────────────────────────────────────────────

    /// Autocomplete suggestions for a company name or ticker fragment.
    pub async fn search_symbols(&self, query: &str) -> Result<Vec<SymbolSuggestion>, CoreError> {
        self.market_data_service.search_symbols(query).await
    }

    // ── Settings ────────────────────────────────────────────────────

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Set the drop threshold used by the next calculation, in percent (0, 100].
    /// The last result's drop list is refreshed to match.
    pub fn set_drop_threshold(&mut self, threshold_pct: f64) -> Result<(), CoreError> {
        validate_threshold(threshold_pct)?;
        self.settings.drop_threshold_pct = threshold_pct;
        if let Some(result) = self.last_result.as_mut() {
            result.drops = self
                .analytics_service
                .drops_for_threshold(&result.monthly, threshold_pct);
            result.drop_threshold_pct = threshold_pct;
        }
        Ok(())
    }

    /// Set an API key for a provider (e.g., "eodhd").
    /// Rebuilds the market data provider so the new key takes effect immediately.
    pub fn set_api_key(&mut self, provider: String, key: String) -> Result<(), CoreError> {
        self.settings.api_keys.insert(provider, key);
        self.rebuild_default_providers()
    }

    /// Remove an API key for a provider. Returns whether a key was removed.
    pub fn remove_api_key(&mut self, provider: &str) -> Result<bool, CoreError> {
        let removed = self.settings.api_keys.remove(provider).is_some();
        if removed {
            self.rebuild_default_providers()?;
        }
        Ok(removed)
    }

    // ── Cache Management ────────────────────────────────────────────

    /// Number of symbols whose history is cached for this session.
    #[must_use]
    pub fn cache_symbol_count(&self) -> usize {
        self.price_cache.symbol_count()
    }

    /// Forget all cached histories.
    pub fn cache_clear(&mut self) {
        self.price_cache.clear();
    }

    // ── Internal ────────────────────────────────────────────────────

    fn rebuild_default_providers(&mut self) -> Result<(), CoreError> {
        let market = default_market_provider(&self.settings)?;
        let fx: Box<dyn ExchangeRateProvider> = Box::new(FrankfurterProvider::new());
        self.market_data_service = MarketDataService::new(market, Some(fx));
        self.price_cache.clear();
        self.last_result = None;
        Ok(())
    }
}

fn default_market_provider(settings: &Settings) -> Result<Box<dyn MarketDataProvider>, CoreError> {
    if let Some(key) = settings.api_keys.get("eodhd") {
        return Ok(Box::new(EodhdProvider::new(
            key.clone(),
            settings.exchange_code.clone(),
        )));
    }

    // Yahoo Finance needs no key but is not available on WASM.
    #[cfg(not(target_arch = "wasm32"))]
    let fallback: Result<Box<dyn MarketDataProvider>, CoreError> =
        YahooFinanceProvider::new().map(|p| Box::new(p) as Box<dyn MarketDataProvider>);

    #[cfg(target_arch = "wasm32")]
    let fallback: Result<Box<dyn MarketDataProvider>, CoreError> = Err(CoreError::NoProvider(
        "market data (set an \"eodhd\" API key)".into(),
    ));

    fallback
}
