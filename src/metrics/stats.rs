use std::time::Duration;

use super::types::ResultSet;

const NANOS_PER_SEC_X1000: u128 = 1_000_000_000_000;

/// Immutable snapshot of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statistics {
    pub requested: u64,
    pub successes: u64,
    /// Everything that was not a success, timeouts included.
    pub failures: u64,
    pub timeouts: u64,
    /// Success latencies, ascending.
    pub latencies: Vec<Duration>,
    pub total_duration: Duration,
    pub average: Duration,
    /// `latencies[count / 2]`: the upper-middle sample for even counts.
    pub median: Duration,
    pub avg_inter_response: Duration,
    /// Requests per second, fixed point with three decimals, rounded half up.
    pub requests_per_sec_x1000: u64,
}

impl Statistics {
    /// Aggregates a finished result set. Throughput and inter-response time
    /// are derived from `requested`, not from the success count.
    #[must_use]
    pub fn aggregate(results: &ResultSet, total_duration: Duration, requested: u64) -> Self {
        let mut latencies: Vec<Duration> = results
            .iter()
            .filter(|result| result.outcome.is_success())
            .map(|result| result.elapsed)
            .collect();
        latencies.sort_unstable();

        let timeouts = results
            .iter()
            .filter(|result| result.outcome.is_timeout())
            .count();

        let successes = u64::try_from(latencies.len()).unwrap_or(u64::MAX);
        let (average, median) = if latencies.is_empty() {
            (Duration::ZERO, Duration::ZERO)
        } else {
            let sum: u128 = latencies.iter().map(Duration::as_nanos).sum();
            let count = u128::from(successes);
            let average = duration_from_nanos(sum.checked_div(count).unwrap_or(0));
            let middle = latencies.len().checked_div(2).unwrap_or(0);
            let median = latencies.get(middle).copied().unwrap_or(Duration::ZERO);
            (average, median)
        };

        let total_nanos = total_duration.as_nanos();
        let requests_per_sec_x1000 = u128::from(requested)
            .saturating_mul(NANOS_PER_SEC_X1000)
            .saturating_add(total_nanos.checked_div(2).unwrap_or(0))
            .checked_div(total_nanos)
            .map_or(0, |value| u64::try_from(value).unwrap_or(u64::MAX));
        let avg_inter_response =
            duration_from_nanos(total_nanos.checked_div(u128::from(requested)).unwrap_or(0));

        Self {
            requested,
            successes,
            failures: requested.saturating_sub(successes),
            timeouts: u64::try_from(timeouts).unwrap_or(u64::MAX),
            latencies,
            total_duration,
            average,
            median,
            avg_inter_response,
            requests_per_sec_x1000,
        }
    }
}

fn duration_from_nanos(nanos: u128) -> Duration {
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}
