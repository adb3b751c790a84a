//! Data Source Verification Module
//!
//! Checks the configured index sources against the live providers: is the
//! URL reachable, does the document still parse with the configured format
//! constants, and how current is the latest published month.
//!
//! Run this after a provider redesign before trusting new format constants.

use chrono::{NaiveDate, Utc};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::analysis::staleness;
use crate::config::ServiceConfig;
use crate::ingest;
use crate::logging;
use crate::model::{IndexError, IndexKind, YearMonth};
use crate::series::IndexSeries;
use crate::sources;

// ============================================================================
// Verification Results
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub timestamp: String,
    pub results: Vec<SourceVerification>,
    pub summary: VerificationSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub total: usize,
    pub working: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceVerification {
    pub index: IndexKind,
    pub url: String,
    pub status: VerificationStatus,
    pub reachable: bool,
    pub parsed: bool,
    pub record_count: usize,
    pub first_month: Option<YearMonth>,
    pub last_month: Option<YearMonth>,
    pub as_of: Option<String>,
    pub lag_months: Option<i64>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum VerificationStatus {
    /// Fetched, parsed, and no more behind than the source usually is.
    Success,
    /// Fetched and parsed, but the latest month is later than expected.
    PartialSuccess,
    Failed,
}

// ============================================================================
// Verification
// ============================================================================

/// Verifies one source against the live provider.
pub fn verify_source(
    client: &Client,
    kind: IndexKind,
    config: &ServiceConfig,
) -> SourceVerification {
    let url = config.url_for(kind).to_string();

    let raw = match ingest::http::fetch_text(client, kind, &url) {
        Ok(raw) => raw,
        Err(err) => {
            logging::log_index_failure(kind, "verify fetch", &err);
            return failed(kind, url, false, &err);
        }
    };

    match ingest::parse_index(kind, &raw, config) {
        Ok(series) => summarize(kind, url, &series, Utc::now().date_naive()),
        Err(err) => {
            logging::log_index_failure(kind, "verify parse", &err);
            failed(kind, url, true, &err)
        }
    }
}

/// Verifies every registered source and builds a report.
pub fn verify_all(client: &Client, config: &ServiceConfig) -> VerificationReport {
    let results: Vec<SourceVerification> = IndexKind::ALL
        .iter()
        .map(|&kind| verify_source(client, kind, config))
        .collect();
    build_report(results)
}

fn build_report(results: Vec<SourceVerification>) -> VerificationReport {
    let working = results
        .iter()
        .filter(|r| r.status != VerificationStatus::Failed)
        .count();
    VerificationReport {
        timestamp: Utc::now().to_rfc3339(),
        summary: VerificationSummary {
            total: results.len(),
            working,
            failed: results.len() - working,
        },
        results,
    }
}

/// Result for a source that parsed. Status depends on the lag against `today`.
fn summarize(
    kind: IndexKind,
    url: String,
    series: &IndexSeries,
    today: NaiveDate,
) -> SourceVerification {
    let expected_lag = sources::find_source(kind)
        .map(|s| s.expected_lag_months)
        .unwrap_or(2);

    let mut result = SourceVerification {
        index: kind,
        url,
        status: VerificationStatus::Failed,
        reachable: true,
        parsed: true,
        record_count: series.len(),
        first_month: series.first_observed().ok().map(|r| r.month),
        last_month: series.last_observed().ok().map(|r| r.month),
        as_of: series.as_of_label().ok(),
        lag_months: staleness::lag_months_at(series, today).ok(),
        error_message: None,
    };

    result.status = match staleness::is_stale_at(series, expected_lag, today) {
        Ok(false) => VerificationStatus::Success,
        Ok(true) => VerificationStatus::PartialSuccess,
        Err(err) => {
            result.error_message = Some(err.to_string());
            VerificationStatus::Failed
        }
    };
    result
}

fn failed(kind: IndexKind, url: String, reachable: bool, err: &IndexError) -> SourceVerification {
    SourceVerification {
        index: kind,
        url,
        status: VerificationStatus::Failed,
        reachable,
        parsed: false,
        record_count: 0,
        first_month: None,
        last_month: None,
        as_of: None,
        lag_months: None,
        error_message: Some(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MonthlyValue;

    fn series_ending(year: i32, month: u32) -> IndexSeries {
        let records = vec![
            MonthlyValue { month: YearMonth::january(1950), value: -1.5 },
            MonthlyValue { month: YearMonth::new(year, month).unwrap(), value: 0.4 },
        ];
        IndexSeries::new(IndexKind::Oni, records).unwrap()
    }

    #[test]
    fn test_current_series_is_success() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let result = summarize(IndexKind::Oni, sources::ONI_URL.into(), &series_ending(2024, 3), today);
        assert_eq!(result.status, VerificationStatus::Success);
        assert_eq!(result.record_count, 2);
        assert_eq!(result.first_month, Some(YearMonth::january(1950)));
        assert_eq!(result.as_of.as_deref(), Some("Mar 2024"));
        assert_eq!(result.lag_months, Some(2));
    }

    #[test]
    fn test_lagging_series_is_partial_success() {
        let today = NaiveDate::from_ymd_opt(2024, 9, 10).unwrap();
        let result = summarize(IndexKind::Oni, sources::ONI_URL.into(), &series_ending(2024, 3), today);
        assert_eq!(result.status, VerificationStatus::PartialSuccess);
    }

    #[test]
    fn test_empty_series_is_failed() {
        let series = IndexSeries::new(IndexKind::Amo, Vec::new()).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let result = summarize(IndexKind::Amo, sources::AMO_URL.into(), &series, today);
        assert_eq!(result.status, VerificationStatus::Failed);
        assert!(result.error_message.is_some());
    }

    #[test]
    fn test_report_summary_counts() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let ok = summarize(IndexKind::Oni, sources::ONI_URL.into(), &series_ending(2024, 3), today);
        let bad = failed(
            IndexKind::Amo,
            sources::AMO_URL.into(),
            false,
            &IndexError::fetch(IndexKind::Amo, "HTTP 404 Not Found"),
        );
        let report = build_report(vec![ok, bad]);
        assert_eq!(report.summary.total, 2);
        assert_eq!(report.summary.working, 1);
        assert_eq!(report.summary.failed, 1);

        let json = serde_json::to_string(&report).expect("report serializes");
        assert!(json.contains("\"index\":\"oni\""));
        assert!(json.contains("\"status\":\"Failed\""));
    }
}
