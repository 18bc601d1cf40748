//! Core library for the `volley` CLI.
//!
//! This crate provides the building blocks used by the binary: CLI argument
//! types, configuration merging, target resolution, the timed HTTP/1.x
//! transceiver, the worker pool and result aggregation. The primary
//! user-facing interface is the `volley` command-line application.
pub mod app;
pub mod args;
pub mod config;
pub mod error;
pub mod http;
pub mod metrics;
