//! Per-request results, result collection, and run statistics.
mod collector;
mod stats;
mod types;


pub use collector::{CollectedRun, NoProgress, PROGRESS_EVERY, ProgressSink, collect_results};
pub use stats::Statistics;
pub use types::{Outcome, RequestResult, ResultSet, Ticket};
