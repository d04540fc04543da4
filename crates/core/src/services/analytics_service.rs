use log::debug;

use crate::errors::CoreError;
use crate::models::analytics::{AnalysisResult, Drop, MonthlyPoint};
use crate::models::request::{AnalysisRequest, MarketSnapshot};
use crate::services::crisis_service::CrisisService;
use crate::services::drop_service::DropService;
use crate::services::extremes_service::ExtremesService;
use crate::services::monthly_service::{HoldingSeries, MonthlyService};
use crate::services::price_history;
use crate::services::valuation_service::ValuationService;

/// Runs the whole calculation over already-fetched market data.
///
/// `(positions, histories, quotes, FX rate) -> AnalysisResult`, with no I/O:
/// the same request and snapshot always give the same result.
pub struct AnalyticsService {
    valuation_service: ValuationService,
    monthly_service: MonthlyService,
    drop_service: DropService,
    extremes_service: ExtremesService,
    crisis_service: CrisisService,
}

impl AnalyticsService {
    pub fn new() -> Self {
        Self {
            valuation_service: ValuationService::new(),
            monthly_service: MonthlyService::new(),
            drop_service: DropService::new(),
            extremes_service: ExtremesService::new(),
            crisis_service: CrisisService::new(),
        }
    }

    /// Value every position, build the monthly series and derive drops,
    /// annual extremes and crisis performance.
    ///
    /// Any position failing to value aborts the whole calculation.
    pub fn analyze(
        &self,
        request: &AnalysisRequest,
        snapshot: &MarketSnapshot,
    ) -> Result<AnalysisResult, CoreError> {
        let usd_per_eur = snapshot.fx_rate();

        // 1. Value each position
        let mut valuations = Vec::with_capacity(request.positions().len());
        let mut holdings = Vec::with_capacity(request.positions().len());
        for resolved in request.positions() {
            let history = snapshot.history(&resolved.symbol);
            let valuation = self.valuation_service.value_position(
                resolved,
                history,
                snapshot.quotes.get(&resolved.symbol),
                usd_per_eur,
            )?;

            // 2. Month-end closes from the purchase date on
            holdings.push(HoldingSeries {
                shares: valuation.shares,
                closes: price_history::monthly_series(history, Some(resolved.position.purchase_date)),
            });
            valuations.push(valuation);
        }
        let totals = self.valuation_service.totals(&valuations, usd_per_eur);

        // 3. Portfolio series and everything derived from it
        let monthly = self.monthly_service.aggregate(&holdings);
        let drops = self
            .drop_service
            .detect_drops(&monthly, request.drop_threshold_pct());
        let annual_extremes = self.extremes_service.annual_extremes(&monthly, usd_per_eur);
        let crises = self.crisis_service.analyze_all(&monthly, request.crises());

        debug!(
            "Analysed {} positions: {} months, {} drops at {}%, {} years",
            valuations.len(),
            monthly.len(),
            drops.len(),
            request.drop_threshold_pct(),
            annual_extremes.len()
        );

        Ok(AnalysisResult {
            valuations,
            totals,
            monthly,
            drop_threshold_pct: request.drop_threshold_pct(),
            drops,
            annual_extremes,
            crises,
            usd_per_eur,
        })
    }

    /// Recompute the drop list for another threshold without re-running the analysis.
    pub fn drops_for_threshold(&self, monthly: &[MonthlyPoint], threshold_pct: f64) -> Vec<Drop> {
        self.drop_service.detect_drops(monthly, threshold_pct)
    }
}

impl Default for AnalyticsService {
    fn default() -> Self {
        Self::new()
    }
}
