use std::ffi::OsString;

use clap::{ArgMatches, CommandFactory, FromArgMatches};

use crate::app::run_local;
use crate::args::TesterArgs;
use crate::config::{RunConfig, apply_config, load_config};
use crate::error::{AppError, AppResult, ValidationError};
use crate::http::Target;

pub(crate) fn run() -> AppResult<()> {
    let (mut args, matches) = parse_args()?;

    crate::logger::init_logging(args.verbose, args.no_color);

    if let Some(file_config) = load_config(args.config.as_deref())? {
        apply_config(&mut args, &matches, &file_config)?;
    }

    let Some(raw_url) = args.url.clone() else {
        tracing::debug!("No URL given; printing usage.");
        TesterArgs::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = RunConfig::from_args(&args).map_err(AppError::validation)?;
    let target = Target::resolve(&raw_url, config.resolve())?;

    let runtime = build_runtime(args.cpus)?;
    runtime.block_on(run_local(&raw_url, target, &config, args.no_color))?;
    Ok(())
}

fn parse_args() -> AppResult<(TesterArgs, ArgMatches)> {
    let raw_args: Vec<OsString> = std::env::args_os().collect();
    let matches = TesterArgs::command().get_matches_from(raw_args);
    let args = TesterArgs::from_arg_matches(&matches)?;
    Ok((args, matches))
}

fn build_runtime(cpus: usize) -> AppResult<tokio::runtime::Runtime> {
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if cpus > 0 {
        tracing::debug!("Using {} runtime worker threads", cpus);
        builder.worker_threads(cpus);
    }
    builder
        .build()
        .map_err(|source| AppError::validation(ValidationError::RuntimeBuildFailed { source }))
}
