// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::default_config_path;
use crate::types::OverflowBehaviour;

/// Command-line arguments for `tickqueue`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "tickqueue",
    version,
    about = "Run a script of steps through a serialized, timer-driven task queue.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the script file (TOML).
    ///
    /// Default: `Tickqueue.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value_os_t = default_config_path())]
    pub config: PathBuf,

    /// Override `[queue].interval_ms`.
    #[arg(long, value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// Override `[queue].max_backlog`.
    #[arg(long, value_name = "N")]
    pub max_backlog: Option<usize>,

    /// Override `[queue].overflow` (reject, drop_oldest).
    #[arg(long, value_name = "POLICY")]
    pub overflow: Option<OverflowBehaviour>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TICKQUEUE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the plan, but don't run any steps.
    #[arg(long)]
    pub dry_run: bool,
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
