/// Oceanic Niño Index parser.
///
/// The CPC ONI page is an HTML document with several layout tables. One of
/// them, at a fixed position in document order, holds the index as a grid:
/// one row per year, a year cell followed by twelve seasonal values
/// (DJF, JFM, ... NDJ). Column m is taken as month m. The grid repeats its
/// header row every ten years or so, and the current year's row stops at
/// the last published season.
///
/// ONI has no numeric sentinel: a value is missing only when its cell is
/// absent or blank. Any other non-numeric cell aborts the parse.

use std::collections::BTreeMap;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

use crate::ingest::{is_year_token, parse_number};
use crate::model::{IndexError, IndexKind, MonthlyValue, YearMonth};
use crate::series::IndexSeries;
use crate::sources::{MONTHS_PER_ROW, ONI_COLUMNS, ONI_TABLE_INDEX};

const KIND: IndexKind = IndexKind::Oni;

/// Positional layout of the ONI page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OniFormat {
    /// Zero-based position of the grid among all `<table>` elements.
    pub table_index: usize,
    /// Expected cell count of the widest row (year + 12 months).
    pub columns: usize,
}

impl Default for OniFormat {
    fn default() -> Self {
        OniFormat {
            table_index: ONI_TABLE_INDEX,
            columns: ONI_COLUMNS,
        }
    }
}

/// One year's row: `None` where the cell is absent or blank.
type YearRow = [Option<f64>; MONTHS_PER_ROW];

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Parses the ONI HTML document into a canonical monthly series.
///
/// # Errors
/// - `SourceFormat` if the grid table is missing, its widest row does not
///   have `format.columns` cells, it has no year rows, or a year repeats.
/// - `DataType` if a row label carries digits but is not a four-digit year,
///   or a value cell is neither blank nor a number.
pub fn parse_oni_html(html: &str, format: &OniFormat) -> Result<IndexSeries, IndexError> {
    let rows = extract_table_rows(html, format.table_index)?;
    let grid = build_year_grid(&rows, format)?;
    let series = reshape_to_series(&grid)?;

    info!(
        index = KIND.name(),
        years = grid.len(),
        records = series.len(),
        "parsed ONI table"
    );
    Ok(series)
}

// ---------------------------------------------------------------------------
// Stage 1: table extraction
// ---------------------------------------------------------------------------

/// Returns the text of every cell of the `table_index`-th table, row by row.
///
/// Rows belonging to tables nested inside the selected one are skipped, so a
/// row is only ever attributed to its innermost table.
fn extract_table_rows(html: &str, table_index: usize) -> Result<Vec<Vec<String>>, IndexError> {
    let document = Html::parse_document(html);
    let table_selector = selector("table")?;
    let row_selector = selector("tr")?;

    let tables: Vec<ElementRef> = document.select(&table_selector).collect();
    let table = tables.get(table_index).ok_or_else(|| {
        IndexError::source_format(
            KIND,
            format!(
                "expected grid at table position {}, document has {} tables",
                table_index,
                tables.len()
            ),
        )
    })?;

    let rows = table
        .select(&row_selector)
        .filter(|row| {
            row.ancestors()
                .find(|node| node.value().as_element().is_some_and(|el| el.name() == "table"))
                == Some(**table)
        })
        .map(|row| {
            row.children()
                .filter_map(ElementRef::wrap)
                .filter(|cell| matches!(cell.value().name(), "td" | "th"))
                .map(|cell| cell_text(&cell))
                .collect::<Vec<String>>()
        })
        .filter(|cells| !cells.is_empty())
        .collect();

    Ok(rows)
}

fn selector(css: &str) -> Result<Selector, IndexError> {
    Selector::parse(css)
        .map_err(|e| IndexError::source_format(KIND, format!("bad selector '{}': {:?}", css, e)))
}

/// Cell text with non-breaking spaces folded and surrounding whitespace trimmed.
fn cell_text(cell: &ElementRef) -> String {
    cell.text()
        .collect::<String>()
        .replace('\u{a0}', " ")
        .trim()
        .to_string()
}

// ---------------------------------------------------------------------------
// Stage 2: year grid
// ---------------------------------------------------------------------------

fn build_year_grid(
    rows: &[Vec<String>],
    format: &OniFormat,
) -> Result<BTreeMap<i32, YearRow>, IndexError> {
    let widest = rows.iter().map(Vec::len).max().unwrap_or(0);
    if widest != format.columns {
        return Err(IndexError::source_format(
            KIND,
            format!(
                "grid table has {} columns, expected {}",
                widest, format.columns
            ),
        ));
    }

    let mut grid = BTreeMap::new();
    for (row_no, cells) in rows.iter().enumerate() {
        let first = cells[0].as_str();
        if is_header_label(first) {
            debug!(index = KIND.name(), row = row_no, label = first, "skipping header row");
            continue;
        }
        let bad_label =
            || IndexError::data_type(KIND, format!("row {}: bad year label '{}'", row_no, first));
        if !is_year_token(first) {
            return Err(bad_label());
        }
        let year: i32 = first.parse().map_err(|_| bad_label())?;

        let mut values: YearRow = [None; MONTHS_PER_ROW];
        for (i, cell) in cells.iter().skip(1).take(MONTHS_PER_ROW).enumerate() {
            if cell.is_empty() {
                continue;
            }
            let value = parse_number(cell).ok_or_else(|| {
                IndexError::data_type(
                    KIND,
                    format!("{} month {}: '{}' is not a number", year, i + 1, cell),
                )
            })?;
            values[i] = Some(value);
        }

        if grid.insert(year, values).is_some() {
            return Err(IndexError::source_format(
                KIND,
                format!("year {} appears in more than one row", year),
            ));
        }
    }

    if grid.is_empty() {
        return Err(IndexError::source_format(KIND, "grid table has no year rows"));
    }
    Ok(grid)
}

/// A row label with no digits at all ("Year", a blank spacer) marks a
/// repeated header. Anything carrying digits must be a year.
fn is_header_label(label: &str) -> bool {
    !label.chars().any(|c| c.is_ascii_digit())
}

// ---------------------------------------------------------------------------
// Stage 3: reshape wide grid to long series
// ---------------------------------------------------------------------------

/// Walks every (year, month) from the first to the last year in the grid and
/// keeps the reported cells. Iteration order is chronological, so the
/// records come out ascending without a sort.
fn reshape_to_series(grid: &BTreeMap<i32, YearRow>) -> Result<IndexSeries, IndexError> {
    let (Some(&first_year), Some(&last_year)) = (grid.keys().next(), grid.keys().next_back())
    else {
        return IndexSeries::new(KIND, Vec::new());
    };

    let mut records = Vec::with_capacity(grid.len() * MONTHS_PER_ROW);
    let mut missing = 0usize;
    for year in first_year..=last_year {
        for month in 1..=MONTHS_PER_ROW as u32 {
            let cell = grid.get(&year).and_then(|row| row[month as usize - 1]);
            match (cell, YearMonth::new(year, month)) {
                (Some(value), Some(month)) => records.push(MonthlyValue { month, value }),
                _ => missing += 1,
            }
        }
    }

    if missing > 0 {
        debug!(index = KIND.name(), missing, "dropped unreported months");
    }
    IndexSeries::new(KIND, records)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "<tr><th>Year</th><th>DJF</th><th>JFM</th><th>FMA</th><th>MAM</th>\
        <th>AMJ</th><th>MJJ</th><th>JJA</th><th>JAS</th><th>ASO</th><th>SON</th>\
        <th>OND</th><th>NDJ</th></tr>";

    fn year_row(year: i32, values: &[&str]) -> String {
        let cells: String = values.iter().map(|v| format!("<td>{}</td>", v)).collect();
        format!("<tr><td>{}</td>{}</tr>", year, cells)
    }

    fn full_row(year: i32, base: f64) -> String {
        let values: Vec<String> = (0..12).map(|i| format!("{:.1}", base + i as f64 * 0.1)).collect();
        let refs: Vec<&str> = values.iter().map(String::as_str).collect();
        year_row(year, &refs)
    }

    /// Document with `decoys` layout tables before the grid.
    fn document(decoys: usize, grid_rows: &str) -> String {
        let mut html = String::from("<html><body>");
        for i in 0..decoys {
            html.push_str(&format!("<table><tr><td>nav {}</td></tr></table>", i));
        }
        html.push_str("<table>");
        html.push_str(grid_rows);
        html.push_str("</table><table><tr><td>footer</td></tr></table></body></html>");
        html
    }

    fn format_at(table_index: usize) -> OniFormat {
        OniFormat { table_index, ..OniFormat::default() }
    }

    #[test]
    fn test_parses_grid_at_known_position() {
        let rows = format!("{}{}{}", HEADER, full_row(1950, -1.5), full_row(1951, -0.8));
        let series = parse_oni_html(&document(2, &rows), &format_at(2)).expect("valid grid");
        assert_eq!(series.len(), 24);
        let first = series.full()[0];
        assert_eq!(first.month, YearMonth::new(1950, 1).unwrap());
        assert!((first.value - -1.5).abs() < 1e-9);
        assert_eq!(series.last_observed().unwrap().month, YearMonth::new(1951, 12).unwrap());
    }

    #[test]
    fn test_interleaved_header_rows_are_discarded() {
        let rows = format!(
            "{}{}{}{}{}",
            HEADER,
            full_row(1950, 0.0),
            HEADER,
            full_row(1951, 0.0),
            full_row(1952, 0.0)
        );
        let series = parse_oni_html(&document(0, &rows), &format_at(0)).unwrap();
        assert_eq!(series.len(), 36);
    }

    #[test]
    fn test_unpublished_trailing_months_are_dropped() {
        let rows = format!(
            "{}{}{}",
            HEADER,
            full_row(2023, 0.5),
            year_row(2024, &["1.8", "1.5", "1.1"])
        );
        let series = parse_oni_html(&document(1, &rows), &format_at(1)).unwrap();
        assert_eq!(series.len(), 12 + 3);
        assert_eq!(series.as_of_label().unwrap(), "Mar 2024");
    }

    #[test]
    fn test_blank_cells_count_as_missing() {
        let rows = format!(
            "{}{}",
            HEADER,
            year_row(2024, &["1.8", "1.5", "&nbsp;", " ", "", "0.1", "", "", "", "", "", ""])
        );
        let series = parse_oni_html(&document(0, &rows), &format_at(0)).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.get(YearMonth::new(2024, 6).unwrap()), Some(0.1));
    }

    #[test]
    fn test_non_numeric_cell_is_data_type_error() {
        let mut values = vec!["0.1"; 12];
        values[4] = "n/a";
        let rows = format!("{}{}", HEADER, year_row(1990, &values));
        let result = parse_oni_html(&document(0, &rows), &format_at(0));
        assert!(
            matches!(result, Err(IndexError::DataType { .. })),
            "expected DataType error, got {:?}",
            result
        );
    }

    #[test]
    fn test_missing_table_is_source_format_error() {
        let rows = format!("{}{}", HEADER, full_row(1950, 0.0));
        let result = parse_oni_html(&document(0, &rows), &format_at(8));
        assert!(matches!(result, Err(IndexError::SourceFormat { .. })));
    }

    #[test]
    fn test_wrong_column_count_is_source_format_error() {
        // The first decoy table has a single column.
        let rows = format!("{}{}", HEADER, full_row(1950, 0.0));
        let result = parse_oni_html(&document(1, &rows), &format_at(0));
        assert!(matches!(result, Err(IndexError::SourceFormat { .. })));
    }

    #[test]
    fn test_repeated_year_is_source_format_error() {
        let rows = format!("{}{}{}", HEADER, full_row(1950, 0.0), full_row(1950, 0.0));
        let result = parse_oni_html(&document(0, &rows), &format_at(0));
        assert!(matches!(result, Err(IndexError::SourceFormat { .. })));
    }

    #[test]
    fn test_missing_year_row_leaves_gap() {
        let rows = format!("{}{}{}", HEADER, full_row(1950, 0.0), full_row(1952, 0.0));
        let series = parse_oni_html(&document(0, &rows), &format_at(0)).unwrap();
        assert_eq!(series.len(), 24);
        assert_eq!(series.since(1951).first().unwrap().month, YearMonth::january(1952));
    }

    #[test]
    fn test_nested_table_rows_are_not_attributed_to_outer_table() {
        let html = format!(
            "<table><tr><td><table><tr><td>inner</td></tr></table></td></tr></table>\
             <table>{}{}</table>",
            HEADER,
            full_row(2000, 0.0)
        );
        // Document order: outer(0), inner(1), grid(2).
        let series = parse_oni_html(&html, &format_at(2)).unwrap();
        assert_eq!(series.len(), 12);
    }

    #[test]
    fn test_garbled_year_label_is_data_type_error() {
        let garbled = full_row(1951, 0.3).replacen("<td>1951</td>", "<td>195l</td>", 1);
        let rows = format!(
            "{}{}{}{}",
            HEADER,
            full_row(1950, 0.0),
            garbled,
            full_row(1952, 0.0)
        );
        let result = parse_oni_html(&document(0, &rows), &format_at(0));
        assert!(
            matches!(result, Err(IndexError::DataType { index: IndexKind::Oni, .. })),
            "a mislabelled data row must not be skipped, got {:?}",
            result
        );
    }

    #[test]
    fn test_header_labels_have_no_digits() {
        assert!(is_header_label("Year"));
        assert!(is_header_label(""));
        assert!(!is_header_label("195l"));
        assert!(!is_header_label("1950*"));
    }
}
