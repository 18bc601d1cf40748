use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::future::try_join_all;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::config::RunConfig;
use crate::error::{AppError, AppResult};
use crate::http::Transceiver;
use crate::metrics::{CollectedRun, ProgressSink, RequestResult, Ticket, collect_results};

/// Pre-loaded multi-consumer queue of `total` tickets. Each index in
/// `[0, total)` is handed out exactly once; an exhausted queue returns `None`.
#[derive(Debug)]
pub struct WorkQueue {
    total: u64,
    next: AtomicU64,
}

impl WorkQueue {
    #[must_use]
    pub const fn new(total: u64) -> Self {
        Self {
            total,
            next: AtomicU64::new(0),
        }
    }

    pub fn next_ticket(&self) -> Option<Ticket> {
        loop {
            let current = self.next.load(Ordering::Relaxed);
            if current >= self.total {
                return None;
            }
            let next = current.checked_add(1)?;
            if self
                .next
                .compare_exchange(current, next, Ordering::Relaxed, Ordering::Relaxed)
                .is_ok()
            {
                return Some(Ticket::new(current));
            }
        }
    }

    #[must_use]
    pub fn remaining(&self) -> u64 {
        self.total.saturating_sub(self.next.load(Ordering::Relaxed))
    }
}

/// Runs the whole load: `concurrency` workers drain a queue of `requests`
/// tickets through `transceiver` while the caller's task collects results.
///
/// # Errors
///
/// Returns an error when a worker task panics or the collector ends up with
/// fewer results than requested.
pub async fn run_load<T>(
    config: &RunConfig,
    transceiver: Arc<T>,
    progress: &mut dyn ProgressSink,
) -> AppResult<CollectedRun>
where
    T: Transceiver + 'static,
{
    let queue = Arc::new(WorkQueue::new(config.requests()));
    let (results_tx, results_rx) = mpsc::channel::<RequestResult>(config.concurrency());

    let run_start = Instant::now();
    let workers = spawn_workers(config.concurrency(), &queue, &transceiver, &results_tx);
    drop(results_tx);

    let collected = collect_results(results_rx, config.requests(), run_start, progress).await;

    try_join_all(workers).await?;

    collected.map_err(AppError::metrics)
}

fn spawn_workers<T>(
    concurrency: usize,
    queue: &Arc<WorkQueue>,
    transceiver: &Arc<T>,
    results_tx: &mpsc::Sender<RequestResult>,
) -> Vec<JoinHandle<()>>
where
    T: Transceiver + 'static,
{
    let mut handles = Vec::with_capacity(concurrency);
    for worker_id in 0..concurrency {
        let queue = Arc::clone(queue);
        let transceiver = Arc::clone(transceiver);
        let results_tx = results_tx.clone();

        handles.push(tokio::spawn(async move {
            let mut sent: u64 = 0;
            while let Some(ticket) = queue.next_ticket() {
                let result = transceiver.send(ticket).await;
                if results_tx.send(result).await.is_err() {
                    tracing::warn!("Worker {} stopping: result channel closed", worker_id);
                    break;
                }
                sent = sent.saturating_add(1);
            }
            tracing::debug!("Worker {} drained after {} requests", worker_id, sent);
        }));
    }
    handles
}
