use std::sync::Arc;

use crate::config::RunConfig;
use crate::error::{AppError, AppResult};
use crate::http::{HttpTransceiver, Target};
use crate::metrics::Statistics;

use super::dispatch::run_load;
use super::progress::ProgressLine;
use super::summary::print_summary;

/// Runs one load test against an already resolved target and prints the
/// report to stdout.
///
/// # Errors
///
/// Returns an error when the transceiver cannot be set up or the run does
/// not produce one result per request.
pub async fn run_local(
    raw_url: &str,
    target: Target,
    config: &RunConfig,
    no_color: bool,
) -> AppResult<Statistics> {
    let transceiver =
        HttpTransceiver::new(Arc::new(target), config.timeout()).map_err(AppError::http)?;

    println!("Statistics for requests to {}", raw_url);
    tracing::debug!(
        "Dispatching {} requests over {} workers (timeout {:?}, resolve {})",
        config.requests(),
        config.concurrency(),
        config.timeout(),
        config.resolve().as_str()
    );

    let mut progress = ProgressLine::new(config.progress(), no_color);
    let run = run_load(config, Arc::new(transceiver), &mut progress).await?;
    let stats = Statistics::aggregate(&run.results, run.duration, config.requests());

    tracing::info!(
        "Run finished: {} ok, {} failed ({} timed out) in {:?}",
        stats.successes,
        stats.failures,
        stats.timeouts,
        stats.total_duration
    );
    print_summary(&stats);
    Ok(stats)
}
