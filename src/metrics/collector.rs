use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::error::MetricsError;

use super::types::{RequestResult, ResultSet};

/// Progress is reported after every this many collected results.
pub const PROGRESS_EVERY: u64 = 100;

/// Receives transient progress while results are collected.
pub trait ProgressSink {
    fn update(&mut self, completed: u64, total: u64);

    /// Called once all results are in; erases anything `update` left behind.
    fn finish(&mut self);
}

/// Progress sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn update(&mut self, _completed: u64, _total: u64) {}

    fn finish(&mut self) {}
}

#[derive(Debug)]
pub struct CollectedRun {
    pub results: ResultSet,
    pub duration: Duration,
}

/// Collects exactly `expected` results in arrival order. The returned
/// duration spans from `run_start` to the moment the last result arrived.
///
/// # Errors
///
/// Returns `ResultsIncomplete` when every sender is dropped before
/// `expected` results were received.
pub async fn collect_results(
    mut results_rx: mpsc::Receiver<RequestResult>,
    expected: u64,
    run_start: Instant,
    progress: &mut dyn ProgressSink,
) -> Result<CollectedRun, MetricsError> {
    let mut results = ResultSet::with_capacity(usize::try_from(expected).unwrap_or(0));
    let mut received: u64 = 0;

    while received < expected {
        let Some(result) = results_rx.recv().await else {
            progress.finish();
            return Err(MetricsError::ResultsIncomplete { expected, received });
        };
        results.push(result);
        received = received.saturating_add(1);

        if received.checked_rem(PROGRESS_EVERY) == Some(0) {
            progress.update(received, expected);
        }
    }

    let duration = run_start.elapsed();
    progress.finish();
    Ok(CollectedRun { results, duration })
}
