//! Dispatch engine: work queue, worker pool, and the local run driver.
mod dispatch;
mod progress;
mod runner;
pub(crate) mod summary;


pub use dispatch::{WorkQueue, run_load};
pub use runner::run_local;
