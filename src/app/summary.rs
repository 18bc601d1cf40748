use std::time::Duration;

use crate::metrics::Statistics;

/// Divisor for the fixed-point requests-per-second value.
const RATE_DIVISOR: u64 = 1_000;

pub(crate) fn summary_lines(stats: &Statistics) -> Vec<String> {
    vec![
        format!("Total requests performed:       {}", stats.requested),
        format!("Total failures:                 {}", stats.failures),
        format!(
            "Time taken for tests:           {}",
            format_duration(stats.total_duration)
        ),
        format!(
            "Average request takes:          {}",
            format_duration(stats.average)
        ),
        format!(
            "Median request time:            {}",
            format_duration(stats.median)
        ),
        format!(
            "Average time between responses: {}",
            format_duration(stats.avg_inter_response)
        ),
        format!(
            "Average requests per second:    {}",
            format_rate(stats.requests_per_sec_x1000)
        ),
    ]
}

pub(crate) fn print_summary(stats: &Statistics) {
    println!();
    for line in summary_lines(stats) {
        println!("{}", line);
    }
}

pub(crate) fn format_rate(rate_x1000: u64) -> String {
    format!(
        "{}.{:03}",
        rate_x1000.checked_div(RATE_DIVISOR).unwrap_or(0),
        rate_x1000.checked_rem(RATE_DIVISOR).unwrap_or(0)
    )
}

/// `Debug` rendering, except that zero reads `0s`.
pub(crate) fn format_duration(duration: Duration) -> String {
    if duration.is_zero() {
        return "0s".to_owned();
    }
    format!("{:?}", duration)
}
