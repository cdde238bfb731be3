// tests/logging_filter.rs

use std::error::Error;

use tickqueue::cli::LogLevel;
use tickqueue::logging::{build_filter, DEFAULT_DIRECTIVES};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn log_level_flag_only_targets_this_crate() -> TestResult {
    let filter = build_filter(Some(LogLevel::Debug))?.to_string();

    assert!(filter.contains("tickqueue=debug"), "unexpected filter: {filter}");
    assert!(!filter.contains("tickqueue=info"), "unexpected filter: {filter}");
    Ok(())
}

#[test]
fn trace_flag_keeps_dependencies_at_warn() -> TestResult {
    let filter = build_filter(Some(LogLevel::Trace))?.to_string();

    assert!(filter.contains("tickqueue=trace"), "unexpected filter: {filter}");
    assert!(filter.contains("warn"), "unexpected filter: {filter}");
    Ok(())
}

#[test]
fn default_directives_parse() {
    assert!(tracing_subscriber::EnvFilter::try_new(DEFAULT_DIRECTIVES).is_ok());
}
