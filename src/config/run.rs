use std::time::Duration;

use crate::args::{PositiveU64, PositiveUsize, ResolveStrategy, TesterArgs};
use crate::error::ValidationError;

/// Immutable settings for one load run. Built once from the merged CLI and
/// config values and handed to the dispatch engine by reference.
#[derive(Debug, Clone)]
pub struct RunConfig {
    requests: PositiveU64,
    concurrency: PositiveUsize,
    timeout: Duration,
    resolve: ResolveStrategy,
    progress: bool,
}

impl RunConfig {
    /// # Errors
    ///
    /// Returns `ConcurrencyExceedsRequests` when there would be idle workers
    /// from the start.
    pub fn new(
        requests: PositiveU64,
        concurrency: PositiveUsize,
        timeout: Duration,
        resolve: ResolveStrategy,
    ) -> Result<Self, ValidationError> {
        let workers = u64::try_from(concurrency.get()).unwrap_or(u64::MAX);
        if workers > requests.get() {
            return Err(ValidationError::ConcurrencyExceedsRequests {
                concurrency: concurrency.get(),
                requests: requests.get(),
            });
        }
        Ok(Self {
            requests,
            concurrency,
            timeout,
            resolve,
            progress: true,
        })
    }

    /// # Errors
    ///
    /// See [`RunConfig::new`].
    pub fn from_args(args: &TesterArgs) -> Result<Self, ValidationError> {
        let config = Self::new(
            args.requests,
            args.concurrency,
            Duration::from_millis(args.timeout_ms.get()),
            args.resolve,
        )?;
        Ok(config.with_progress(!args.no_progress))
    }

    #[must_use]
    pub const fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    #[must_use]
    pub const fn requests(&self) -> u64 {
        self.requests.get()
    }

    #[must_use]
    pub const fn concurrency(&self) -> usize {
        self.concurrency.get()
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub const fn resolve(&self) -> ResolveStrategy {
        self.resolve
    }

    #[must_use]
    pub const fn progress(&self) -> bool {
        self.progress
    }
}
