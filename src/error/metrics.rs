use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Result channel closed after {received} of {expected} results.")]
    ResultsIncomplete { expected: u64, received: u64 },
}
