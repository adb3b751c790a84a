//! Ocean index service.
//!
//! Fetches the Oceanic Niño Index (ONI) and the Atlantic Multidecadal
//! Oscillation (AMO) index from their NOAA publications and normalizes
//! both into the same canonical monthly series (`series::IndexSeries`).
//!
//! Module map:
//! - `model`    — month key, monthly record, index identifiers, errors.
//! - `series`   — the canonical series and its read-only queries.
//! - `sources`  — source registry and positional format constants.
//! - `config`   — TOML configuration with registry defaults.
//! - `ingest`   — fetch + ONI/AMO parsers.
//! - `analysis` — phase classification and staleness.
//! - `logging`  — tracing setup and failure classification.
//! - `verify`   — live source verification report.

pub mod analysis;
pub mod config;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod series;
pub mod sources;
pub mod verify;

pub use model::{IndexError, IndexKind, MonthlyValue, YearMonth};
pub use series::IndexSeries;
