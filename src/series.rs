//! The canonical monthly index series.
//!
//! Both parsers produce an `IndexSeries`. Construction validates the series
//! invariants once; after that the series is immutable and every query is a
//! read-only view over the records.

use serde::Serialize;

use crate::model::{IndexError, IndexKind, MonthlyValue, YearMonth};
use crate::sources::is_sentinel;

/// A strictly ascending, duplicate-free monthly series for one index.
///
/// Invariants (checked by `IndexSeries::new`):
///   - records are sorted ascending by `month`, no month appears twice
///   - every value is finite
///   - for sources with a missing-value marker, no value is that marker
///     (within `SENTINEL_TOLERANCE`); see `IndexSeries::with_sentinel`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexSeries {
    kind: IndexKind,
    records: Vec<MonthlyValue>,
}

impl IndexSeries {
    /// Validates `records` and wraps them as a series.
    ///
    /// Returns `SourceFormat` if the records are out of order, repeat a
    /// month, or carry a non-finite value. Parsers only emit records in
    /// iteration order, so a failure here means the source repeated a year
    /// row.
    pub fn new(kind: IndexKind, records: Vec<MonthlyValue>) -> Result<Self, IndexError> {
        Self::validated(kind, records, None)
    }

    /// Like `new`, and also rejects any value equal to `sentinel`.
    ///
    /// Used by sources that mark unreported months with a placeholder. The
    /// parser is expected to have dropped them already.
    pub fn with_sentinel(
        kind: IndexKind,
        records: Vec<MonthlyValue>,
        sentinel: f64,
    ) -> Result<Self, IndexError> {
        Self::validated(kind, records, Some(sentinel))
    }

    fn validated(
        kind: IndexKind,
        records: Vec<MonthlyValue>,
        sentinel: Option<f64>,
    ) -> Result<Self, IndexError> {
        for pair in records.windows(2) {
            if pair[1].month <= pair[0].month {
                return Err(IndexError::source_format(
                    kind,
                    format!(
                        "months not strictly ascending: {} followed by {}",
                        pair[0].month, pair[1].month
                    ),
                ));
            }
        }

        if let Some(bad) = records.iter().find(|r| !r.value.is_finite()) {
            return Err(IndexError::source_format(
                kind,
                format!("non-finite value {} at {}", bad.value, bad.month),
            ));
        }

        if let Some(sentinel) = sentinel {
            if let Some(bad) = records.iter().find(|r| is_sentinel(r.value, sentinel)) {
                return Err(IndexError::source_format(
                    kind,
                    format!("sentinel value {} at {}", bad.value, bad.month),
                ));
            }
        }

        Ok(IndexSeries { kind, records })
    }

    pub fn kind(&self) -> IndexKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The entire series, ascending.
    pub fn full(&self) -> &[MonthlyValue] {
        &self.records
    }

    /// Records on or after January of `year`.
    ///
    /// Returns the full series if it starts after January of `year`, and an
    /// empty slice if every record is earlier.
    pub fn since(&self, year: i32) -> &[MonthlyValue] {
        let start = YearMonth::january(year);
        let idx = self.records.partition_point(|r| r.month < start);
        &self.records[idx..]
    }

    /// Earliest record.
    pub fn first_observed(&self) -> Result<&MonthlyValue, IndexError> {
        self.records.first().ok_or_else(|| self.empty_error())
    }

    /// Most recent record.
    pub fn last_observed(&self) -> Result<&MonthlyValue, IndexError> {
        self.records.last().ok_or_else(|| self.empty_error())
    }

    /// "Data as of" label for the most recent record, e.g. `"Mar 2024"`.
    pub fn as_of_label(&self) -> Result<String, IndexError> {
        let last = self.last_observed()?;
        let day = last.month.first_day().ok_or_else(|| {
            IndexError::source_format(self.kind, format!("{} is outside the calendar range", last.month))
        })?;
        Ok(day.format("%b %Y").to_string())
    }

    /// Reading for a specific month, if reported.
    pub fn get(&self, month: YearMonth) -> Option<f64> {
        self.records
            .binary_search_by(|r| r.month.cmp(&month))
            .ok()
            .map(|i| self.records[i].value)
    }

    fn empty_error(&self) -> IndexError {
        IndexError::EmptySeries(format!("{} series has no records", self.kind))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
