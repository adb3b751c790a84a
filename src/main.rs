use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use ocean_index_service::analysis::{phases, staleness};
use ocean_index_service::config::ServiceConfig;
use ocean_index_service::ingest;
use ocean_index_service::logging;
use ocean_index_service::verify;
use ocean_index_service::{IndexError, IndexKind, IndexSeries};

/// Fetch and normalize the ONI and AMO ocean-climate indices.
#[derive(Parser, Debug)]
#[command(name = "ocean-index", version)]
struct Args {
    /// Config file (defaults to $OCEAN_INDEX_CONFIG, then built-in defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// One line per index: record count, coverage and "as of" month
    Summary,
    /// Print one index's monthly series
    Series {
        /// oni or amo
        #[arg(long)]
        index: IndexKind,
        /// Only months from January of this year onward
        #[arg(long)]
        since: Option<i32>,
        /// Emit JSON instead of tab-separated text
        #[arg(long)]
        json: bool,
    },
    /// Check every source against the live provider
    Verify {
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ServiceConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ServiceConfig::discover().context("loading config")?,
    };
    logging::init_logging(&config.logging).context("initializing logging")?;

    let client = ingest::http::build_client(&config.http).context("building HTTP client")?;

    match args.command.unwrap_or(Command::Summary) {
        Command::Summary => run_summary(&client, &config),
        Command::Series { index, since, json } => run_series(&client, &config, index, since, json),
        Command::Verify { json } => run_verify(&client, &config, json),
    }
}

fn run_summary(client: &reqwest::blocking::Client, config: &ServiceConfig) -> Result<()> {
    let (lines, failed) = summarize_all(|kind| ingest::fetch_index(client, kind, config));
    for line in &lines {
        println!("{}", line);
    }
    logging::log_run_summary(IndexKind::ALL.len(), IndexKind::ALL.len() - failed, failed);

    if failed == IndexKind::ALL.len() {
        anyhow::bail!("no index could be normalized");
    }
    Ok(())
}

/// One output line per index and the number of indices that failed. A
/// failure for one index never stops the others.
fn summarize_all<F>(mut fetch: F) -> (Vec<String>, usize)
where
    F: FnMut(IndexKind) -> Result<IndexSeries, IndexError>,
{
    let mut lines = Vec::with_capacity(IndexKind::ALL.len());
    let mut failed = 0;
    for kind in IndexKind::ALL {
        let line = fetch(kind)
            .map_err(|err| ("fetch", err))
            .and_then(|series| summary_line(&series).map_err(|err| ("summarize", err)));
        match line {
            Ok(line) => lines.push(line),
            Err((operation, err)) => {
                logging::log_index_failure(kind, operation, &err);
                lines.push(format!("{:<4} unavailable: {}", kind, err));
                failed += 1;
            }
        }
    }
    (lines, failed)
}

fn summary_line(series: &IndexSeries) -> Result<String, IndexError> {
    let first = series.first_observed()?;
    let last = series.last_observed()?;
    let lag = staleness::lag_months_at(series, chrono::Utc::now().date_naive())?;
    let mut line = format!(
        "{:<4} {:>5} months  {} .. {}  data as of {} ({} months behind)  latest {:+.2}",
        series.kind(),
        series.len(),
        first.month,
        last.month,
        series.as_of_label()?,
        lag,
        last.value
    );
    if series.kind() == IndexKind::Oni {
        let phase = phases::classify(last.value, phases::ENSO_THRESHOLD);
        line.push_str(&format!("  phase {:?}", phase));
    }
    Ok(line)
}

fn run_series(
    client: &reqwest::blocking::Client,
    config: &ServiceConfig,
    kind: IndexKind,
    since: Option<i32>,
    json: bool,
) -> Result<()> {
    let series = ingest::fetch_index(client, kind, config)
        .inspect_err(|err| logging::log_index_failure(kind, "fetch", err))?;

    let records = match since {
        Some(year) => series.since(year),
        None => series.full(),
    };
    info!(index = kind.name(), records = records.len(), "printing series");

    if json {
        println!("{}", serde_json::to_string_pretty(records)?);
    } else {
        for record in records {
            println!("{}\t{:.3}", record.month, record.value);
        }
    }
    Ok(())
}

fn run_verify(client: &reqwest::blocking::Client, config: &ServiceConfig, json: bool) -> Result<()> {
    let report = verify::verify_all(client, config);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for result in &report.results {
            println!("{} ({})", result.index, result.url);
            println!("  Status: {:?}", result.status);
            println!("  Records: {}", result.record_count);
            if let Some(as_of) = &result.as_of {
                println!("  Data as of: {}", as_of);
            }
            if let Some(lag) = result.lag_months {
                println!("  Lag: {} months", lag);
            }
            if let Some(error) = &result.error_message {
                println!("  Error: {}", error);
            }
        }
        println!(
            "Summary: {}/{} working, {} failed",
            report.summary.working, report.summary.total, report.summary.failed
        );
    }
    Ok(())
}
