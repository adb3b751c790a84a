/// Structured logging for the ocean index service
///
/// Installs a `tracing` subscriber (console, plus an optional append-mode
/// log file) and classifies pipeline failures so provider outages and
/// upstream format drift land at different severities.

use std::fmt;
use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::model::{IndexError, IndexKind};

// ---------------------------------------------------------------------------
// Subscriber setup
// ---------------------------------------------------------------------------

/// Installs the global subscriber.
///
/// `RUST_LOG` takes precedence over `config.level`. When `config.file` is
/// set, events go to that file (appended) instead of stderr. Calling this
/// twice is harmless: the second call leaves the first subscriber in place.
pub fn init_logging(config: &LoggingConfig) -> Result<(), IndexError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| IndexError::Config(format!("invalid log level '{}': {}", config.level, e)))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let result = match &config.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| IndexError::Config(format!("cannot open log file {}: {}", path, e)))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    if result.is_err() {
        debug!("tracing subscriber already installed");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// Unexpected failure - the source changed shape or the config is wrong
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Classifies a pipeline error.
///
/// Fetch failures are `Unknown`: providers go down and come back. Format
/// and data-type failures are `Unexpected`: the upstream layout moved and
/// the format constants need attention. An empty series is `Unknown`.
pub fn classify_failure(err: &IndexError) -> FailureType {
    match err {
        IndexError::Fetch { .. } => FailureType::Unknown,
        IndexError::SourceFormat { .. } | IndexError::DataType { .. } => FailureType::Unexpected,
        IndexError::EmptySeries(_) => FailureType::Unknown,
        IndexError::Config(_) => FailureType::Unexpected,
    }
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Logs an index failure at the level its classification calls for.
pub fn log_index_failure(kind: IndexKind, operation: &str, err: &IndexError) {
    let failure_type = classify_failure(err);
    let index = kind.name();

    match failure_type {
        FailureType::Unexpected => {
            error!(index, operation, failure = %failure_type, "{}", err)
        }
        FailureType::Unknown => {
            warn!(index, operation, failure = %failure_type, "{}", err)
        }
    }
}

// ---------------------------------------------------------------------------
// Run Summary Logging
// ---------------------------------------------------------------------------

/// Logs a summary of a multi-index run.
pub fn log_run_summary(total: usize, successful: usize, failed: usize) {
    let message = format!(
        "Run complete: {}/{} indices normalized, {} failed",
        successful, total, failed
    );

    if failed == 0 {
        info!("{}", message);
    } else if successful == 0 {
        error!("{}", message);
    } else {
        warn!("{}", message);
    }
}
