use std::collections::BTreeMap;

use crate::models::analytics::{MonthlyPoint, YearExtreme};

/// Reduces the monthly series to per-year lows and highs.
pub struct ExtremesService;

impl ExtremesService {
    pub fn new() -> Self {
        Self
    }

    /// Per calendar year, the minimum and maximum monthly value and the month
    /// each occurred in, sorted by year.
    ///
    /// Ties keep the first month seen. With a usable `usd_per_eur` the
    /// extremes are also given in EUR at that single rate.
    pub fn annual_extremes(&self, series: &[MonthlyPoint], usd_per_eur: Option<f64>) -> Vec<YearExtreme> {
        let rate = usd_per_eur.filter(|r| r.is_finite() && *r > 0.0);
        let mut by_year: BTreeMap<i32, YearExtreme> = BTreeMap::new();

        for point in series {
            let year = point.month.year();
            let extreme = by_year.entry(year).or_insert_with(|| YearExtreme {
                year,
                min_value_usd: point.value_usd,
                min_month: point.month.clone(),
                max_value_usd: point.value_usd,
                max_month: point.month.clone(),
                min_value_eur: None,
                max_value_eur: None,
            });
            if point.value_usd < extreme.min_value_usd {
                extreme.min_value_usd = point.value_usd;
                extreme.min_month = point.month.clone();
            }
            if point.value_usd > extreme.max_value_usd {
                extreme.max_value_usd = point.value_usd;
                extreme.max_month = point.month.clone();
            }
        }

        by_year
            .into_values()
            .map(|mut extreme| {
                if let Some(rate) = rate {
                    extreme.min_value_eur = Some(extreme.min_value_usd / rate);
                    extreme.max_value_eur = Some(extreme.max_value_usd / rate);
                }
                extreme
            })
            .collect()
    }
}

impl Default for ExtremesService {
    fn default() -> Self {
        Self::new()
    }
}
