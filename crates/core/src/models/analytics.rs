use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::crisis::CrisisEvent;
use super::month::YearMonth;
use super::position::Currency;

/// Where a position's current close came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceSource {
    /// The live quote.
    LiveQuote,
    /// The live quote was unavailable; last record of the daily history.
    LastHistoricalClose,
}

/// Valuation of a single position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionValuation {
    pub position_id: u64,

    /// Normalised provider symbol
    pub symbol: String,

    /// Amount as entered, in `currency`
    pub amount: f64,
    pub currency: Currency,

    /// Amount converted to USD (EUR without a rate is taken as USD)
    pub amount_usd: f64,

    /// Purchase date as entered
    pub requested_date: NaiveDate,

    /// First trading day on or after `requested_date`
    pub purchase_date_used: NaiveDate,
    pub purchase_close: f64,

    pub shares: f64,

    pub current_close: f64,
    pub current_price_source: PriceSource,

    pub current_value_usd: f64,

    /// current_value_usd - amount_usd
    pub gain_usd: f64,

    /// (gain_usd / amount_usd) * 100
    pub return_pct: f64,
}

/// Portfolio-level totals.
///
/// `invested_usd` and `invested_eur_original` are deliberately not
/// equivalent: the latter sums only the EUR-denominated amounts as entered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioTotals {
    pub invested_usd: f64,
    pub invested_eur_original: f64,
    pub current_value_usd: f64,
    /// Current value divided by the FX rate, when one is available
    pub current_value_eur: Option<f64>,
    pub gain_usd: f64,
    pub return_pct: f64,
}

/// Portfolio value at the end of one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPoint {
    pub month: YearMonth,
    pub value_usd: f64,
    /// `value / previous value - 1`; `None` for the first month or when the
    /// previous value is not positive.
    pub month_over_month_change: Option<f64>,
}

/// A month whose decline met the drop threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drop {
    pub month: YearMonth,
    pub value_usd: f64,
    pub month_over_month_change: f64,
}

/// Lowest and highest monthly value of a calendar year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearExtreme {
    pub year: i32,
    pub min_value_usd: f64,
    pub min_month: YearMonth,
    pub max_value_usd: f64,
    pub max_month: YearMonth,
    pub min_value_eur: Option<f64>,
    pub max_value_eur: Option<f64>,
}

/// Portfolio behaviour during one crisis window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrisisPerformance {
    pub event: CrisisEvent,
    /// `None` when the window lies entirely outside the monthly series.
    pub stats: Option<CrisisStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrisisStats {
    pub start_value_usd: f64,
    pub end_value_usd: f64,
    /// `(end - start) / start`, `None` if start is not positive
    pub pct_change: Option<f64>,

    /// Worst peak-to-point decline inside the window, `<= 0`
    pub max_drawdown: f64,

    /// Running peak in force when the worst drawdown was recorded.
    /// The trough-related fields below are `None` when the window never
    /// declined from its running peak.
    pub peak_value_usd: Option<f64>,
    pub peak_month: Option<YearMonth>,
    pub trough_value_usd: Option<f64>,
    pub trough_month: Option<YearMonth>,

    /// First month after the trough, anywhere in the series, at or above the peak.
    /// `None` means not yet recovered within the available data.
    pub recovery_month: Option<YearMonth>,
    pub months_to_recovery_from_start: Option<i32>,
    pub months_to_recovery_from_trough: Option<i32>,
}

/// Everything one calculation produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub valuations: Vec<PositionValuation>,
    pub totals: PortfolioTotals,
    pub monthly: Vec<MonthlyPoint>,
    pub drop_threshold_pct: f64,
    pub drops: Vec<Drop>,
    pub annual_extremes: Vec<YearExtreme>,
    pub crises: Vec<CrisisPerformance>,
    /// USD per EUR used for every conversion, if one was available
    pub usd_per_eur: Option<f64>,
}
