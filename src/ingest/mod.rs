/// Source ingestion: fetch the raw documents and normalize them.
///
/// Each index runs the same three stages: fetch the raw document, reshape
/// its table into month-keyed records, validate into an `IndexSeries`.
/// Parsing is a pure function of the raw text (`parse_index`), so callers
/// can wrap fetching with whatever caching they need without touching it.
///
/// Submodules:
/// - `http` — blocking HTTPS fetch.
/// - `oni`  — ONI HTML table parser.
/// - `amo`  — AMO whitespace text parser.

pub mod amo;
pub mod http;
pub mod oni;

use reqwest::blocking::Client;
use tracing::info;

use crate::config::ServiceConfig;
use crate::model::{IndexError, IndexKind};
use crate::series::IndexSeries;

/// Parses a raw source document for `kind` using the layout in `config`.
pub fn parse_index(
    kind: IndexKind,
    raw: &str,
    config: &ServiceConfig,
) -> Result<IndexSeries, IndexError> {
    match kind {
        IndexKind::Oni => oni::parse_oni_html(raw, &config.oni.format()),
        IndexKind::Amo => amo::parse_amo_text(raw, &config.amo.format()),
    }
}

/// Fetches and parses one index.
pub fn fetch_index(
    client: &Client,
    kind: IndexKind,
    config: &ServiceConfig,
) -> Result<IndexSeries, IndexError> {
    let url = config.url_for(kind);
    let raw = http::fetch_text(client, kind, url)?;
    info!(index = kind.name(), bytes = raw.len(), "fetched source");
    parse_index(kind, &raw, config)
}

// ---------------------------------------------------------------------------
// Token helpers shared by both parsers
// ---------------------------------------------------------------------------

/// `true` for exactly four ASCII digits.
pub(crate) fn is_year_token(s: &str) -> bool {
    s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit())
}

/// Parses a finite decimal number. `NaN`/`inf` spellings are rejected.
pub(crate) fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_year_token() {
        assert!(is_year_token("1950"));
        assert!(!is_year_token("Year"));
        assert!(!is_year_token("195"));
        assert!(!is_year_token("19500"));
        assert!(!is_year_token("-950"));
    }

    #[test]
    fn test_parse_number_rejects_non_finite() {
        assert_eq!(parse_number("-0.5"), Some(-0.5));
        assert_eq!(parse_number(" 1.25 "), Some(1.25));
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("--"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn test_parse_index_dispatches_by_kind() {
        let config = ServiceConfig::default();
        let amo = " 1856 1856\n 1856 0.1 0.2 0.3 0.4 0.5 0.6 0.7 0.8 0.9 1.0 1.1 1.2\n a\n b\n c\n d\n";
        let series = parse_index(IndexKind::Amo, amo, &config).expect("valid AMO block");
        assert_eq!(series.kind(), IndexKind::Amo);
        assert_eq!(series.len(), 12);

        let result = parse_index(IndexKind::Oni, amo, &config);
        assert!(matches!(result, Err(IndexError::SourceFormat { .. })));
    }
}
