use serde::Deserialize;

use crate::args::ResolveStrategy;

#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub url: Option<String>,
    pub requests: Option<u64>,
    pub concurrency: Option<usize>,
    pub timeout_ms: Option<u64>,
    pub cpus: Option<usize>,
    pub resolve: Option<ResolveStrategy>,
    pub no_progress: Option<bool>,
}
