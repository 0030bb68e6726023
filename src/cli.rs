// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `assetflow`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "assetflow",
    version,
    about = "Build front-end assets around a static site generator and serve them with live reload.",
    long_about = None
)]
pub struct CliArgs {
    /// Task to run: build, build:prod, build:assets, browser,
    /// browser:reload, serve, deploy, or any other registered task.
    #[arg(value_name = "TASK", default_value = "serve")]
    pub task: String,

    /// Path to the config file (TOML, or JSON such as `package.json`).
    #[arg(long, value_name = "PATH", default_value = "Assetflow.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `ASSETFLOW_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print the registered tasks and exit without running anything.
    #[arg(long)]
    pub list: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
