use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// A calendar month keyed as a zero-padded `"YYYY-MM"` string.
///
/// Ordering is the derived lexical ordering of the string. Because the year is
/// always four digits and the month always two, lexical order equals
/// chronological order, which is what the monthly aggregation relies on when
/// it sorts the union of months.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth(String);

impl YearMonth {
    /// Build from numeric parts (year 0..=9999, month 1..=12).
    pub fn new(year: i32, month: u32) -> Result<Self, CoreError> {
        if !(0..=9999).contains(&year) || !(1..=12).contains(&month) {
            return Err(CoreError::ValidationError(format!(
                "Invalid year/month: {year}-{month}"
            )));
        }
        Ok(Self(format!("{year:04}-{month:02}")))
    }

    /// The month a date falls in (the first 7 characters of `YYYY-MM-DD`).
    pub fn from_date(date: NaiveDate) -> Self {
        Self(format!("{:04}-{:02}", date.year(), date.month()))
    }

    /// Parse a `"YYYY-MM"` string.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let invalid = || CoreError::ValidationError(format!("Invalid month '{s}', expected YYYY-MM"));
        let (y, m) = s.split_once('-').ok_or_else(invalid)?;
        if y.len() != 4 || m.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = y.parse().map_err(|_| invalid())?;
        let month: u32 = m.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn year(&self) -> i32 {
        self.0[..4].parse().unwrap_or_default()
    }

    pub fn month(&self) -> u32 {
        self.0[5..7].parse().unwrap_or_default()
    }

    /// Whole calendar months from `self` to `later`:
    /// `(yearB - yearA) * 12 + (monthB - monthA)`. Negative if `later` is earlier.
    pub fn months_until(&self, later: &YearMonth) -> i32 {
        (later.year() - self.year()) * 12 + (later.month() as i32 - self.month() as i32)
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for YearMonth {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.0
    }
}
