use serde::{Deserialize, Serialize};

use super::month::YearMonth;

/// A named historical market-stress window, inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrisisEvent {
    pub id: String,
    pub name: String,
    pub start_month: YearMonth,
    pub end_month: YearMonth,
}

impl CrisisEvent {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        start_month: YearMonth,
        end_month: YearMonth,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            start_month,
            end_month,
        }
    }

    /// Whether `month` lies inside the window.
    pub fn contains(&self, month: &YearMonth) -> bool {
        &self.start_month <= month && month <= &self.end_month
    }
}

// (id, name, start, end)
const CATALOGUE: &[(&str, &str, (i32, u32), (i32, u32))] = &[
    ("dotcom", "Dot-com crash", (2000, 3), (2002, 10)),
    ("sept11", "September 11 attacks", (2001, 9), (2001, 10)),
    ("gfc", "Global financial crisis", (2007, 10), (2009, 3)),
    ("flash-crash", "Flash crash", (2010, 4), (2010, 7)),
    ("euro-debt", "European debt crisis", (2011, 4), (2011, 10)),
    ("china-2015", "China devaluation & oil slump", (2015, 8), (2016, 2)),
    ("volmageddon", "Volmageddon & Q4 selloff", (2018, 10), (2018, 12)),
    ("covid", "COVID-19 crash", (2020, 2), (2020, 3)),
    ("inflation-2022", "Inflation & rate-hike bear market", (2022, 1), (2022, 10)),
];

/// The fixed catalogue of crisis windows, ordered by start month.
pub fn default_catalogue() -> Vec<CrisisEvent> {
    CATALOGUE
        .iter()
        .filter_map(|&(id, name, (sy, sm), (ey, em))| {
            let start = YearMonth::new(sy, sm).ok()?;
            let end = YearMonth::new(ey, em).ok()?;
            Some(CrisisEvent::new(id, name, start, end))
        })
        .collect()
}
