use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::errors::CoreError;
use crate::models::month::YearMonth;
use crate::models::price::{DailyPriceRecord, MonthlyClose};

/// First record dated on or after `date`.
///
/// A purchase requested on a weekend or holiday executes on the next trading
/// day. `history` must be ascending by date (binary search, O(log n)).
pub fn close_on_or_after<'a>(
    symbol: &str,
    history: &'a [DailyPriceRecord],
    date: NaiveDate,
) -> Result<&'a DailyPriceRecord, CoreError> {
    let idx = history.partition_point(|r| r.date < date);
    history.get(idx).ok_or_else(|| CoreError::NoTradingDay {
        symbol: symbol.to_string(),
        date: date.to_string(),
    })
}

/// Last record of the history, if any.
pub fn last_record(history: &[DailyPriceRecord]) -> Option<&DailyPriceRecord> {
    history.last()
}

/// One close per calendar month: the month's last available record.
///
/// Records dated strictly before `since` are ignored. The result is sorted by
/// month; later records of a month replace earlier ones.
pub fn monthly_series(history: &[DailyPriceRecord], since: Option<NaiveDate>) -> Vec<MonthlyClose> {
    let mut by_month: BTreeMap<YearMonth, &DailyPriceRecord> = BTreeMap::new();
    for record in history {
        if since.is_some_and(|s| record.date < s) {
            continue;
        }
        by_month.insert(YearMonth::from_date(record.date), record);
    }

    by_month
        .into_iter()
        .map(|(month, record)| MonthlyClose {
            month,
            date: record.date,
            close: record.close,
        })
        .collect()
}
