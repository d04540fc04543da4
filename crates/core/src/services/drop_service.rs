use crate::models::analytics::{Drop, MonthlyPoint};

/// Finds months whose month-over-month decline meets a threshold.
pub struct DropService;

impl DropService {
    pub fn new() -> Self {
        Self
    }

    /// Months with a change `<= -threshold_pct / 100`, in series order.
    ///
    /// The first month (no change) never qualifies. A larger threshold never
    /// returns more months than a smaller one.
    pub fn detect_drops(&self, series: &[MonthlyPoint], threshold_pct: f64) -> Vec<Drop> {
        let limit = -threshold_pct / 100.0;
        series
            .iter()
            .filter_map(|point| {
                let change = point.month_over_month_change?;
                (change <= limit).then(|| Drop {
                    month: point.month.clone(),
                    value_usd: point.value_usd,
                    month_over_month_change: change,
                })
            })
            .collect()
    }
}

impl Default for DropService {
    fn default() -> Self {
        Self::new()
    }
}
