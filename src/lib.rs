// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod promise;
pub mod script;
pub mod types;

use anyhow::Result;
use tracing::debug;

use crate::cli::CliArgs;
use crate::config::model::{ConfigFile, RawConfigFile};
use crate::config::load_from_path;
use crate::script::run_script;

pub use crate::engine::{ManualQueue, QueueOptions, TaskQueue, TickOutcome};
pub use crate::errors::TickQueueError;
pub use crate::promise::Promise;
pub use crate::types::OverflowBehaviour;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - script loading, CLI overrides and validation
/// - the task queue and its worker
/// - printing the journal to stdout
pub async fn run(args: CliArgs) -> Result<()> {
    let mut raw = load_from_path(&args.config)?;
    apply_overrides(&mut raw, &args);
    let cfg = ConfigFile::try_from(raw)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let journal = run_script(&cfg).await?;
    for entry in journal.entries() {
        println!("{entry}");
    }

    Ok(())
}

/// CLI flags win over the `[queue]` section.
fn apply_overrides(raw: &mut RawConfigFile, args: &CliArgs) {
    if let Some(ms) = args.interval_ms {
        raw.queue.interval_ms = ms;
    }
    if let Some(n) = args.max_backlog {
        raw.queue.max_backlog = Some(n);
    }
    if let Some(overflow) = args.overflow {
        raw.queue.overflow = overflow;
    }
}

/// Simple dry-run output: print queue settings and steps.
fn print_dry_run(cfg: &ConfigFile) {
    println!("tickqueue dry-run");
    println!("  queue.interval_ms = {}", cfg.queue.interval_ms);
    match cfg.queue.max_backlog {
        Some(n) => println!("  queue.max_backlog = {n}"),
        None => println!("  queue.max_backlog = unbounded"),
    }
    println!("  queue.overflow = {:?}", cfg.queue.overflow);
    println!();

    println!("steps ({}):", cfg.step.len());
    for step in &cfg.step {
        let mode = if step.immediate { "immediate" } else { "deferred" };
        println!("  - {} ({mode})", step.label);
    }

    debug!("dry-run complete (no execution)");
}
