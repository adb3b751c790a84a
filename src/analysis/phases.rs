//! Phase classification of index readings.
//!
//! A reading at or above `+threshold` is warm, at or below `-threshold` is
//! cool, anything between is neutral. For ONI the NOAA convention is a
//! ±0.5 °C threshold, and an El Niño / La Niña episode is a run of at least
//! five consecutive warm / cool months.

use serde::Serialize;

use crate::model::{IndexKind, MonthlyValue, YearMonth};
use crate::series::IndexSeries;

/// ONI anomaly threshold in °C.
pub const ENSO_THRESHOLD: f64 = 0.5;

/// Minimum consecutive months for an ENSO episode.
pub const EPISODE_MIN_MONTHS: usize = 5;

/// Phases, in ascending order of temperature anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Cool,
    Neutral,
    Warm,
}

/// A maximal run of consecutive months in the same phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseRun {
    pub phase: Phase,
    pub start: YearMonth,
    pub end: YearMonth,
    pub months: usize,
    /// Reading with the largest magnitude in the run.
    pub peak: f64,
}

/// Classifies a single reading.
pub fn classify(value: f64, threshold: f64) -> Phase {
    if value >= threshold {
        Phase::Warm
    } else if value <= -threshold {
        Phase::Cool
    } else {
        Phase::Neutral
    }
}

/// Groups records into runs of the same phase.
///
/// A missing month breaks a run even when the phase on both sides matches.
pub fn phase_runs(records: &[MonthlyValue], threshold: f64) -> Vec<PhaseRun> {
    let mut runs: Vec<PhaseRun> = Vec::new();

    for record in records {
        let phase = classify(record.value, threshold);
        match runs.last_mut() {
            Some(run) if run.phase == phase && run.end.succ() == record.month => {
                run.end = record.month;
                run.months += 1;
                if record.value.abs() > run.peak.abs() {
                    run.peak = record.value;
                }
            }
            _ => runs.push(PhaseRun {
                phase,
                start: record.month,
                end: record.month,
                months: 1,
                peak: record.value,
            }),
        }
    }

    runs
}

/// El Niño (warm) and La Niña (cool) episodes in an ONI series.
///
/// Returns an empty list for any other index.
pub fn enso_episodes(series: &IndexSeries) -> Vec<PhaseRun> {
    if series.kind() != IndexKind::Oni {
        return Vec::new();
    }
    phase_runs(series.full(), ENSO_THRESHOLD)
        .into_iter()
        .filter(|run| run.phase != Phase::Neutral && run.months >= EPISODE_MIN_MONTHS)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
