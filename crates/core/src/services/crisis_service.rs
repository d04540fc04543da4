use crate::models::analytics::{CrisisPerformance, CrisisStats, MonthlyPoint};
use crate::models::crisis::CrisisEvent;
use crate::models::month::YearMonth;

/// Measures the portfolio through historical crisis windows: change over the
/// window, worst peak-to-trough drawdown inside it, and when (if ever) the
/// pre-drawdown peak was regained.
pub struct CrisisService;

/// Worst decline found by the drawdown scan.
struct Trough<'a> {
    index: usize,
    point: &'a MonthlyPoint,
    peak_value: f64,
    peak_month: &'a YearMonth,
}

impl CrisisService {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate every event against the same monthly series.
    pub fn analyze_all(&self, series: &[MonthlyPoint], events: &[CrisisEvent]) -> Vec<CrisisPerformance> {
        events
            .iter()
            .map(|event| CrisisPerformance {
                event: event.clone(),
                stats: self.analyze(series, event),
            })
            .collect()
    }

    /// Stats for one window; `None` when no month of the series falls inside it.
    ///
    /// `series` must be ascending by month.
    pub fn analyze(&self, series: &[MonthlyPoint], event: &CrisisEvent) -> Option<CrisisStats> {
        let lo = series.partition_point(|p| p.month < event.start_month);
        let hi = series.partition_point(|p| p.month <= event.end_month);
        let in_range = series.get(lo..hi).filter(|r| !r.is_empty())?;

        let first = in_range.first()?;
        let last = in_range.last()?;
        let start_value_usd = first.value_usd;
        let end_value_usd = last.value_usd;
        let pct_change =
            (start_value_usd > 0.0).then(|| (end_value_usd - start_value_usd) / start_value_usd);

        // Single forward pass; only a strictly worse drawdown moves the trough.
        let mut peak = first.value_usd;
        let mut peak_month = &first.month;
        let mut max_drawdown = 0.0;
        let mut trough: Option<Trough> = None;
        for (offset, point) in in_range.iter().enumerate() {
            if point.value_usd > peak {
                peak = point.value_usd;
                peak_month = &point.month;
            }
            if peak > 0.0 {
                let drawdown = point.value_usd / peak - 1.0;
                if drawdown < max_drawdown {
                    max_drawdown = drawdown;
                    trough = Some(Trough {
                        index: lo + offset,
                        point,
                        peak_value: peak,
                        peak_month,
                    });
                }
            }
        }

        // Recovery may happen long after the window closes: search the full series.
        let recovery_month = trough.as_ref().and_then(|t| {
            series[t.index + 1..]
                .iter()
                .find(|p| p.value_usd >= t.peak_value)
                .map(|p| p.month.clone())
        });

        let months_to_recovery_from_start = recovery_month
            .as_ref()
            .map(|r| event.start_month.months_until(r));
        let months_to_recovery_from_trough = recovery_month
            .as_ref()
            .zip(trough.as_ref())
            .map(|(r, t)| t.point.month.months_until(r));

        Some(CrisisStats {
            start_value_usd,
            end_value_usd,
            pct_change,
            max_drawdown,
            peak_value_usd: trough.as_ref().map(|t| t.peak_value),
            peak_month: trough.as_ref().map(|t| t.peak_month.clone()),
            trough_value_usd: trough.as_ref().map(|t| t.point.value_usd),
            trough_month: trough.as_ref().map(|t| t.point.month.clone()),
            recovery_month,
            months_to_recovery_from_start,
            months_to_recovery_from_trough,
        })
    }
}

impl Default for CrisisService {
    fn default() -> Self {
        Self::new()
    }
}
