/// Series staleness detection.
///
/// Both indices are published monthly with a lag of one to two months. A
/// series whose latest month falls further behind than expected usually
/// means the provider stopped updating or the page layout moved the data.
///
/// # Clock injection
/// All functions accept a `today: NaiveDate` parameter rather than calling
/// `Utc::now()` internally. This keeps staleness deterministic in tests.

use chrono::NaiveDate;

use crate::model::{IndexError, YearMonth};
use crate::series::IndexSeries;

// ---------------------------------------------------------------------------
// Staleness check
// ---------------------------------------------------------------------------

/// Months between the latest observed month and the month containing `today`.
///
/// A series whose last record is the current month has a lag of 0.
/// Returns `EmptySeries` if the series has no records.
pub fn lag_months_at(series: &IndexSeries, today: NaiveDate) -> Result<i64, IndexError> {
    let last = series.last_observed()?;
    Ok(last.month.months_until(YearMonth::of(today)))
}

/// Returns `true` if the series lags `today` by more than `max_lag_months`.
///
/// Staleness is strictly greater than the threshold:
///   lag > max_lag_months  →  stale
///   lag == max_lag_months →  not stale
pub fn is_stale_at(
    series: &IndexSeries,
    max_lag_months: u32,
    today: NaiveDate,
) -> Result<bool, IndexError> {
    Ok(lag_months_at(series, today)? > max_lag_months as i64)
}

/// Convenience wrapper that uses the real current date.
/// Use `is_stale_at` in tests to keep them deterministic.
pub fn is_stale(series: &IndexSeries, max_lag_months: u32) -> Result<bool, IndexError> {
    is_stale_at(series, max_lag_months, chrono::Utc::now().date_naive())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
