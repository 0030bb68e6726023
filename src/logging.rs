// src/logging.rs

//! Console logging through `tracing`.
//!
//! The filter comes from `--log-level` when given, else from
//! `ASSETFLOW_LOG`, which accepts full `EnvFilter` directives such as
//! `info,assetflow::watch=trace`. Without either, `info` is used with the
//! image optimizer's own chatter held back to warnings.
//!
//! Everything goes to stderr; stdout carries the site generator's output.

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

use crate::cli::LogLevel;

pub const LOG_ENV: &str = "ASSETFLOW_LOG";

const DEFAULT_DIRECTIVES: &str = "info,oxipng=warn";

pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var(LOG_ENV).ok();
    let filter = build_filter(cli_level, env.as_deref());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("installing log subscriber: {e}"))
}

fn build_filter(cli_level: Option<LogLevel>, env: Option<&str>) -> EnvFilter {
    if let Some(level) = cli_level {
        return EnvFilter::new(directive(level));
    }
    match env.map(str::trim).filter(|s| !s.is_empty()) {
        Some(directives) => EnvFilter::try_new(directives).unwrap_or_else(|e| {
            // No subscriber yet, so this cannot go through tracing.
            eprintln!("assetflow: ignoring {LOG_ENV}={directives:?}: {e}");
            EnvFilter::new(DEFAULT_DIRECTIVES)
        }),
        None => EnvFilter::new(DEFAULT_DIRECTIVES),
    }
}

fn directive(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
