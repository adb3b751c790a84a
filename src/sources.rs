/// Source registry for the ocean index service.
///
/// Defines the published index sources normalized by this service, along
/// with the positional format constants each parser relies on. These are
/// the single source of truth for URLs, table positions and row-skip counts;
/// parsers receive them through `OniFormat` / `AmoFormat` so a change in the
/// upstream layout is a one-line edit here (or in the config file).

use crate::model::IndexKind;

// ---------------------------------------------------------------------------
// ONI (NOAA Climate Prediction Center)
// ---------------------------------------------------------------------------

/// ONI v5 table page. The document embeds several layout tables; the
/// year-by-season grid is one of them.
pub const ONI_URL: &str =
    "https://origin.cpc.ncep.noaa.gov/products/analysis_monitoring/ensostuff/ONI_v5.php";

/// Zero-based position of the index grid among all `<table>` elements in
/// the ONI page, counted in document order (nested tables included).
pub const ONI_TABLE_INDEX: usize = 8;

/// Year column plus one column per month (DJF, JFM, ... NDJ).
pub const ONI_COLUMNS: usize = 13;

// ---------------------------------------------------------------------------
// AMO (NOAA Physical Sciences Laboratory)
// ---------------------------------------------------------------------------

/// Kaplan SST v2 unsmoothed AMO, long record.
pub const AMO_URL: &str = "https://psl.noaa.gov/data/correlation/amon.us.long.data";

/// Leading rows before the first data row (the "first-year last-year" line).
pub const AMO_HEADER_ROWS: usize = 1;

/// Trailing annotation rows after the last data row (missing-value marker,
/// dataset title, provenance, URL).
pub const AMO_FOOTER_ROWS: usize = 4;

/// Year of the first data row.
pub const AMO_START_YEAR: i32 = 1856;

/// Placeholder the AMO file uses for months without a reading.
pub const AMO_SENTINEL: f64 = -99.99;

/// Tolerance used when comparing a parsed value against `AMO_SENTINEL`.
pub const SENTINEL_TOLERANCE: f64 = 1e-6;

/// Values per data row after the year token.
pub const MONTHS_PER_ROW: usize = 12;

// ---------------------------------------------------------------------------
// Source metadata
// ---------------------------------------------------------------------------

/// Metadata for a single published index source.
pub struct IndexSource {
    pub kind: IndexKind,
    /// Official dataset name.
    pub name: &'static str,
    /// Publishing agency / product.
    pub provider: &'static str,
    pub url: &'static str,
    /// Human-readable description of the index and its publication cadence.
    pub description: &'static str,
    /// Typical delay between a month ending and its value being published.
    pub expected_lag_months: u32,
}

/// All index sources normalized by this service.
pub static SOURCE_REGISTRY: &[IndexSource] = &[
    IndexSource {
        kind: IndexKind::Oni,
        name: "Oceanic Niño Index (ONI v5)",
        provider: "NOAA Climate Prediction Center",
        url: ONI_URL,
        description: "3-month running mean of ERSST.v5 SST anomalies in the \
                      Niño 3.4 region. Column m holds the season centred on \
                      month m (DJF = January).",
        expected_lag_months: 2,
    },
    IndexSource {
        kind: IndexKind::Amo,
        name: "Atlantic Multidecadal Oscillation (unsmoothed, long)",
        provider: "NOAA Physical Sciences Laboratory",
        url: AMO_URL,
        description: "Area-weighted North Atlantic SST anomaly, detrended, \
                      from the Kaplan SST v2 dataset. Unreported months are \
                      written as -99.99.",
        expected_lag_months: 2,
    },
];

/// Looks up a source by index kind.
pub fn find_source(kind: IndexKind) -> Option<&'static IndexSource> {
    SOURCE_REGISTRY.iter().find(|s| s.kind == kind)
}

/// Returns `true` if `value` is the AMO missing-value placeholder.
pub fn is_sentinel(value: f64, sentinel: f64) -> bool {
    (value - sentinel).abs() <= SENTINEL_TOLERANCE
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
