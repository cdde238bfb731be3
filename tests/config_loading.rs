// tests/config_loading.rs

use std::io::Write;
use std::time::Duration;

use tempfile::NamedTempFile;
use tickqueue::config::{load_and_validate, ConfigFile};
use tickqueue::errors::TickQueueError;
use tickqueue::OverflowBehaviour;
use tickqueue_test_utils::builders::ConfigFileBuilder;

fn write_script(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn test_full_script_is_parsed() {
    let file = write_script(
        r#"
[queue]
interval_ms = 50
max_backlog = 4
overflow = "drop_oldest"

[[step]]
label = "A"

[[step]]
label = "B"
immediate = true
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.queue.interval(), Duration::from_millis(50));
    assert_eq!(cfg.queue.max_backlog, Some(4));
    assert_eq!(cfg.queue.overflow, OverflowBehaviour::DropOldest);
    assert_eq!(cfg.step.len(), 2);
    assert_eq!(cfg.step[0].label, "A");
    assert!(!cfg.step[0].immediate);
    assert!(cfg.step[1].immediate);
}

#[test]
fn test_queue_section_defaults() {
    let file = write_script(
        r#"
[[step]]
label = "only"
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();
    let options = cfg.queue.options();

    assert_eq!(options.interval, Duration::from_millis(200));
    assert_eq!(options.max_backlog, None);
    assert_eq!(options.overflow, OverflowBehaviour::Reject);
}

#[test]
fn test_missing_steps_returns_config_error() {
    let file = write_script("[queue]\ninterval_ms = 10\n");

    match load_and_validate(file.path()) {
        Err(TickQueueError::ConfigError(msg)) => assert!(msg.contains("[[step]]")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_zero_interval_returns_config_error() {
    let raw = ConfigFileBuilder::new().with_interval_ms(0).step("A").raw();

    match ConfigFile::try_from(raw) {
        Err(TickQueueError::ConfigError(msg)) => assert!(msg.contains("interval_ms")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_zero_backlog_returns_config_error() {
    let raw = ConfigFileBuilder::new().with_max_backlog(0).step("A").raw();

    match ConfigFile::try_from(raw) {
        Err(TickQueueError::ConfigError(msg)) => assert!(msg.contains("max_backlog")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_blank_label_returns_config_error() {
    let raw = ConfigFileBuilder::new().step("A").step("   ").raw();

    match ConfigFile::try_from(raw) {
        Err(TickQueueError::ConfigError(msg)) => assert!(msg.contains("step #2")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_unknown_overflow_returns_toml_error() {
    let file = write_script(
        r#"
[queue]
overflow = "block"

[[step]]
label = "A"
"#,
    );

    match load_and_validate(file.path()) {
        Err(TickQueueError::TomlError(_)) => {}
        Err(e) => panic!("Expected TomlError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_missing_file_returns_io_error() {
    match load_and_validate("/definitely/not/here/Tickqueue.toml") {
        Err(TickQueueError::IoError(_)) => {}
        Err(e) => panic!("Expected IoError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_overflow_from_str_accepts_both_spellings() {
    assert_eq!("reject".parse::<OverflowBehaviour>(), Ok(OverflowBehaviour::Reject));
    assert_eq!("drop-oldest".parse::<OverflowBehaviour>(), Ok(OverflowBehaviour::DropOldest));
    assert_eq!(" DROP_OLDEST ".parse::<OverflowBehaviour>(), Ok(OverflowBehaviour::DropOldest));
    assert!("block".parse::<OverflowBehaviour>().is_err());
}
