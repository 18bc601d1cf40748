use clap::Parser;

use super::defaults::{DEFAULT_CONCURRENCY, DEFAULT_REQUESTS, DEFAULT_TIMEOUT_MS};
use super::parsers::{parse_positive_u64, parse_positive_usize};
use super::types::{PositiveU64, PositiveUsize, ResolveStrategy};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Async HTTP/1.x load tester - fires N requests over C concurrent workers and reports latency and throughput."
)]
pub struct TesterArgs {
    /// Target URL (http or https)
    #[arg(value_name = "URL")]
    pub url: Option<String>,

    /// Number of requests to make
    #[arg(
        long = "requests",
        short = 'n',
        default_value = DEFAULT_REQUESTS,
        value_parser = parse_positive_u64
    )]
    pub requests: PositiveU64,

    /// Concurrency level (must be <= requests)
    #[arg(
        long = "concurrency",
        short = 'c',
        default_value = DEFAULT_CONCURRENCY,
        value_parser = parse_positive_usize
    )]
    pub concurrency: PositiveUsize,

    /// Timeout of each request in milliseconds
    #[arg(
        long = "timeout",
        short = 't',
        default_value = DEFAULT_TIMEOUT_MS,
        value_parser = parse_positive_u64
    )]
    pub timeout_ms: PositiveU64,

    /// Runtime worker threads to use (0 - platform default)
    #[arg(long = "cpus", short = 'p', default_value_t = 0)]
    pub cpus: usize,

    /// DNS resolution strategy: once per run, or once per request
    #[arg(long = "resolve", default_value = "once", value_enum)]
    pub resolve: ResolveStrategy,

    /// Do not print the transient progress line
    #[arg(long = "no-progress")]
    pub no_progress: bool,

    /// Path to config file (TOML or JSON)
    #[arg(long = "config")]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable colored log output
    #[arg(long = "no-color")]
    pub no_color: bool,
}
