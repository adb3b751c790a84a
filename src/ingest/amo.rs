/// Atlantic Multidecadal Oscillation parser.
///
/// The PSL text file is whitespace-delimited: a header line giving the first
/// and last year, one row per year (`YYYY v1 ... v12`), then a few footer
/// lines (the missing-value marker, the dataset title, provenance). Months
/// that were never reported are written as `-99.99`.
///
/// Row position determines the month key: row i is year `start_year + i`.
/// The year token on each row is cross-checked against that expectation.

use tracing::{debug, info};

use crate::ingest::parse_number;
use crate::model::{IndexError, IndexKind, MonthlyValue, YearMonth};
use crate::series::IndexSeries;
use crate::sources::{
    self, AMO_FOOTER_ROWS, AMO_HEADER_ROWS, AMO_SENTINEL, AMO_START_YEAR, MONTHS_PER_ROW,
};

const KIND: IndexKind = IndexKind::Amo;

/// Positional layout of the AMO text file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmoFormat {
    pub header_rows: usize,
    pub footer_rows: usize,
    /// Year of the first data row.
    pub start_year: i32,
    /// Placeholder for unreported months.
    pub sentinel: f64,
}

impl Default for AmoFormat {
    fn default() -> Self {
        AmoFormat {
            header_rows: AMO_HEADER_ROWS,
            footer_rows: AMO_FOOTER_ROWS,
            start_year: AMO_START_YEAR,
            sentinel: AMO_SENTINEL,
        }
    }
}

/// Parses the AMO text block into a canonical monthly series.
///
/// Blank lines are ignored before the header and footer rows are counted.
///
/// # Errors
/// - `SourceFormat` if there are no data rows, a row has fewer than 13
///   tokens, or a row's year is not the next year in sequence.
/// - `DataType` if a year or value token is not a number.
pub fn parse_amo_text(text: &str, format: &AmoFormat) -> Result<IndexSeries, IndexError> {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();

    let skipped = format.header_rows + format.footer_rows;
    if lines.len() <= skipped {
        return Err(IndexError::source_format(
            KIND,
            format!(
                "{} non-blank lines, need more than {} header + {} footer rows",
                lines.len(),
                format.header_rows,
                format.footer_rows
            ),
        ));
    }
    let data_rows = &lines[format.header_rows..lines.len() - format.footer_rows];

    let mut records = Vec::with_capacity(data_rows.len() * MONTHS_PER_ROW);
    let mut sentinels = 0usize;

    for (i, line) in data_rows.iter().enumerate() {
        let expected_year = format.start_year + i as i32;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 1 + MONTHS_PER_ROW {
            return Err(IndexError::source_format(
                KIND,
                format!(
                    "row for {} has {} tokens, expected at least {}",
                    expected_year,
                    tokens.len(),
                    1 + MONTHS_PER_ROW
                ),
            ));
        }

        let year: i32 = tokens[0].parse().map_err(|_| {
            IndexError::data_type(KIND, format!("row {}: bad year token '{}'", i, tokens[0]))
        })?;
        if year != expected_year {
            return Err(IndexError::source_format(
                KIND,
                format!("row {} is labelled {}, expected {}", i, year, expected_year),
            ));
        }

        let values = &tokens[tokens.len() - MONTHS_PER_ROW..];
        for (m, token) in values.iter().enumerate() {
            let value = parse_number(token).ok_or_else(|| {
                IndexError::data_type(
                    KIND,
                    format!("{} month {}: '{}' is not a number", year, m + 1, token),
                )
            })?;
            if sources::is_sentinel(value, format.sentinel) {
                sentinels += 1;
                continue;
            }
            let month = YearMonth::new(year, m as u32 + 1)
                .ok_or_else(|| IndexError::source_format(KIND, "month out of range"))?;
            records.push(MonthlyValue { month, value });
        }
    }

    if sentinels > 0 {
        debug!(index = KIND.name(), sentinels, "dropped missing-value placeholders");
    }

    let series = IndexSeries::with_sentinel(KIND, records, format.sentinel)?;
    info!(
        index = KIND.name(),
        years = data_rows.len(),
        records = series.len(),
        "parsed AMO text"
    );
    Ok(series)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
