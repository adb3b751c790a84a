/// Core data types for the ocean index service.
///
/// This module defines the shared domain model imported by all other modules:
/// the month key, the monthly reading, the index identifiers and the error
/// taxonomy. It contains no I/O.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Index identifiers
// ---------------------------------------------------------------------------

/// The published ocean-climate indices this service knows how to normalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    /// Oceanic Niño Index (NOAA CPC, HTML table).
    Oni,
    /// Atlantic Multidecadal Oscillation index (NOAA PSL, whitespace text).
    Amo,
}

impl IndexKind {
    pub const ALL: [IndexKind; 2] = [IndexKind::Oni, IndexKind::Amo];

    /// Short display name, also used as the `index` field in log events.
    pub fn name(&self) -> &'static str {
        match self {
            IndexKind::Oni => "ONI",
            IndexKind::Amo => "AMO",
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IndexKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "oni" => Ok(IndexKind::Oni),
            "amo" => Ok(IndexKind::Amo),
            other => Err(format!("unknown index '{}', expected 'oni' or 'amo'", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Month key
// ---------------------------------------------------------------------------

/// A calendar month (year + month number), first-of-month semantics.
///
/// Field order matters: the derived `Ord` compares `year` first, then
/// `month`, which is chronological order. The fields are private so every
/// value goes through `new` and `month` stays in 1..=12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawYearMonth")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

/// Unchecked wire shape of `YearMonth`, validated on deserialization.
#[derive(Deserialize)]
struct RawYearMonth {
    year: i32,
    month: u32,
}

impl TryFrom<RawYearMonth> for YearMonth {
    type Error = String;

    fn try_from(raw: RawYearMonth) -> Result<Self, Self::Error> {
        YearMonth::new(raw.year, raw.month)
            .ok_or_else(|| format!("month {} out of range for {}", raw.month, raw.year))
    }
}

impl YearMonth {
    /// Builds a month key, returning `None` if `month` is outside 1..=12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(YearMonth { year, month })
    }

    /// January of `year`.
    pub fn january(year: i32) -> Self {
        YearMonth { year, month: 1 }
    }

    /// The month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        YearMonth { year: date.year(), month: date.month() }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Month number, 1..=12.
    pub fn month(&self) -> u32 {
        self.month
    }

    /// The first day of this month as a calendar date.
    ///
    /// `None` only when the year lies outside chrono's supported range.
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// The following calendar month.
    pub fn succ(&self) -> Self {
        if self.month == 12 {
            YearMonth { year: self.year + 1, month: 1 }
        } else {
            YearMonth { year: self.year, month: self.month + 1 }
        }
    }

    /// Number of months from `self` to `later` (negative if `later` is earlier).
    pub fn months_until(&self, later: YearMonth) -> i64 {
        let a = self.year as i64 * 12 + (self.month as i64 - 1);
        let b = later.year as i64 * 12 + (later.month as i64 - 1);
        b - a
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = String;

    /// Parses `YYYY-MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (y, m) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("expected YYYY-MM, got '{}'", s))?;
        let year: i32 = y.parse().map_err(|_| format!("invalid year in '{}'", s))?;
        let month: u32 = m.parse().map_err(|_| format!("invalid month in '{}'", s))?;
        YearMonth::new(year, month).ok_or_else(|| format!("month out of range in '{}'", s))
    }
}

// ---------------------------------------------------------------------------
// Reading type
// ---------------------------------------------------------------------------

/// One record of a canonical series: the index reading for one month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyValue {
    pub month: YearMonth,
    pub value: f64,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when fetching, parsing or querying an index series.
///
/// Every variant propagates to the caller unmodified; nothing in this crate
/// retries or substitutes data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndexError {
    /// The source was unreachable or answered with a non-2xx status.
    #[error("Fetch error for {index}: {detail}")]
    Fetch { index: IndexKind, detail: String },

    /// The raw document does not have the expected table/row shape.
    #[error("Source format error for {index}: {detail}")]
    SourceFormat { index: IndexKind, detail: String },

    /// A cell or token that should be a year or a number is not.
    #[error("Data type error for {index}: {detail}")]
    DataType { index: IndexKind, detail: String },

    /// A series-level query was made on a series with no records.
    #[error("Empty series: {0}")]
    EmptySeries(String),

    /// The configuration file could not be read or parsed.
    #[error("Config error: {0}")]
    Config(String),
}

impl IndexError {
    pub fn source_format(index: IndexKind, detail: impl Into<String>) -> Self {
        IndexError::SourceFormat { index, detail: detail.into() }
    }

    pub fn data_type(index: IndexKind, detail: impl Into<String>) -> Self {
        IndexError::DataType { index, detail: detail.into() }
    }

    pub fn fetch(index: IndexKind, detail: impl Into<String>) -> Self {
        IndexError::Fetch { index, detail: detail.into() }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_month_orders_chronologically() {
        let dec = YearMonth::new(1999, 12).unwrap();
        let jan = YearMonth::new(2000, 1).unwrap();
        let feb = YearMonth::new(2000, 2).unwrap();
        assert!(dec < jan, "December 1999 must sort before January 2000");
        assert!(jan < feb);
    }

    #[test]
    fn test_year_month_rejects_out_of_range_month() {
        assert!(YearMonth::new(2000, 0).is_none());
        assert!(YearMonth::new(2000, 13).is_none());
    }

    #[test]
    fn test_succ_rolls_over_year() {
        let dec = YearMonth::new(2023, 12).unwrap();
        assert_eq!(dec.succ(), YearMonth::january(2024));
        assert_eq!(YearMonth::january(2024).succ(), YearMonth::new(2024, 2).unwrap());
    }

    #[test]
    fn test_months_until() {
        let a = YearMonth::new(2023, 11).unwrap();
        let b = YearMonth::new(2024, 3).unwrap();
        assert_eq!(a.months_until(b), 4);
        assert_eq!(b.months_until(a), -4);
        assert_eq!(a.months_until(a), 0);
    }

    #[test]
    fn test_first_day_is_first_of_month() {
        let m = YearMonth::new(2024, 3).unwrap();
        assert_eq!(m.first_day(), NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[test]
    fn test_of_date_takes_containing_month() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();
        assert_eq!(YearMonth::of(date), YearMonth::new(2024, 5).unwrap());
    }

    #[test]
    fn test_deserialize_rejects_out_of_range_month() {
        let ok: YearMonth = serde_json::from_str(r#"{"year":2024,"month":3}"#).unwrap();
        assert_eq!((ok.year(), ok.month()), (2024, 3));

        let bad = serde_json::from_str::<YearMonth>(r#"{"year":2024,"month":13}"#);
        assert!(bad.is_err(), "month 13 must not deserialize into a YearMonth");
    }

    #[test]
    fn test_display_and_parse_year_month() {
        let m = YearMonth::new(1950, 7).unwrap();
        assert_eq!(m.to_string(), "1950-07");
        assert_eq!("1950-07".parse::<YearMonth>().unwrap(), m);
        assert!("1950".parse::<YearMonth>().is_err());
        assert!("1950-13".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_index_kind_parses_case_insensitively() {
        assert_eq!("ONI".parse::<IndexKind>().unwrap(), IndexKind::Oni);
        assert_eq!("amo".parse::<IndexKind>().unwrap(), IndexKind::Amo);
        assert!("pdo".parse::<IndexKind>().is_err());
    }

    #[test]
    fn test_error_display_names_index() {
        let err = IndexError::source_format(IndexKind::Amo, "row 3 has 10 tokens");
        assert_eq!(err.to_string(), "Source format error for AMO: row 3 has 10 tokens");
    }
}
