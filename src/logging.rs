// src/logging.rs

//! Logging setup for `tickqueue` using `tracing` + `tracing-subscriber`.
//!
//! The filter comes from, in order:
//! 1. `--log-level`, applied to the `tickqueue` targets only
//! 2. `TICKQUEUE_LOG`, taken as full `EnvFilter` directives
//!    (e.g. `tickqueue::engine=trace,info`)
//! 3. [`DEFAULT_DIRECTIVES`]
//!
//! Logs go to STDERR so that stdout carries only the journal.

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

/// Environment variable holding filter directives.
pub const LOG_ENV: &str = "TICKQUEUE_LOG";

/// Our own targets at `info`, dependencies at `warn`.
pub const DEFAULT_DIRECTIVES: &str = "tickqueue=info,warn";

/// Install the global subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = build_filter(cli_level)?;

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;

    Ok(())
}

/// Resolve the filter from the CLI flag, `TICKQUEUE_LOG`, or the default.
pub fn build_filter(cli_level: Option<LogLevel>) -> Result<EnvFilter> {
    if let Some(level) = cli_level {
        return Ok(EnvFilter::new(crate_directives(level)));
    }

    match std::env::var(LOG_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(directives.trim())
            .with_context(|| format!("invalid {LOG_ENV} directives: {directives:?}")),
        _ => Ok(EnvFilter::new(DEFAULT_DIRECTIVES)),
    }
}

/// `--log-level` only raises or lowers our own targets.
fn crate_directives(level: LogLevel) -> String {
    let level = match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    };
    format!("tickqueue={level},warn")
}
