use std::collections::{BTreeMap, BTreeSet};

use crate::models::analytics::MonthlyPoint;
use crate::models::month::YearMonth;
use crate::models::price::MonthlyClose;

/// One position's contribution: its share count and its month-end closes
/// from the purchase month on.
#[derive(Debug, Clone, PartialEq)]
pub struct HoldingSeries {
    pub shares: f64,
    pub closes: Vec<MonthlyClose>,
}

/// Combines per-position monthly closes into one portfolio value per month.
pub struct MonthlyService;

impl MonthlyService {
    pub fn new() -> Self {
        Self
    }

    /// Aggregate holdings into the monthly portfolio series.
    ///
    /// Months are the union of every holding's months, ascending. A holding
    /// contributes `shares * close` only for months it has a close for, so it
    /// counts from its own purchase month on. Months summing to `<= 0` are
    /// dropped before month-over-month changes are computed.
    pub fn aggregate(&self, holdings: &[HoldingSeries]) -> Vec<MonthlyPoint> {
        let lookups: Vec<BTreeMap<&YearMonth, f64>> = holdings
            .iter()
            .map(|h| h.closes.iter().map(|c| (&c.month, c.close)).collect())
            .collect();

        let months: BTreeSet<&YearMonth> = lookups.iter().flat_map(|l| l.keys().copied()).collect();

        let values: Vec<(YearMonth, f64)> = months
            .into_iter()
            .filter_map(|month| {
                let total: f64 = holdings
                    .iter()
                    .zip(&lookups)
                    .filter_map(|(h, lookup)| lookup.get(month).map(|close| h.shares * close))
                    .sum();
                (total > 0.0).then(|| (month.clone(), total))
            })
            .collect();

        with_changes(values)
    }
}

impl Default for MonthlyService {
    fn default() -> Self {
        Self::new()
    }
}

/// Attach month-over-month changes to an ordered list of month values.
pub fn with_changes(values: Vec<(YearMonth, f64)>) -> Vec<MonthlyPoint> {
    let mut points = Vec::with_capacity(values.len());
    let mut previous: Option<f64> = None;
    for (month, value_usd) in values {
        let month_over_month_change = previous
            .filter(|prev| *prev > 0.0)
            .map(|prev| value_usd / prev - 1.0);
        points.push(MonthlyPoint {
            month,
            value_usd,
            month_over_month_change,
        });
        previous = Some(value_usd);
    }
    points
}
