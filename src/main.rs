mod app;
mod args;
mod config;
mod entry;
mod error;
mod http;
mod logger;
mod metrics;

use std::process::ExitCode;

fn main() -> ExitCode {
    match entry::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!("Run aborted: {:?}", err);
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}
