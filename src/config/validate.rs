// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, TickQueueError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::TickQueueError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.queue, raw.step))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_steps(cfg)?;
    validate_queue_section(cfg)?;
    validate_steps(cfg)?;
    Ok(())
}

fn ensure_has_steps(cfg: &RawConfigFile) -> Result<()> {
    if cfg.step.is_empty() {
        return Err(TickQueueError::ConfigError(
            "script must contain at least one [[step]] entry".to_string(),
        ));
    }
    Ok(())
}

fn validate_queue_section(cfg: &RawConfigFile) -> Result<()> {
    // `overflow` is strongly typed and validated during deserialization.

    if cfg.queue.interval_ms == 0 {
        return Err(TickQueueError::ConfigError(
            "[queue].interval_ms must be >= 1 (got 0)".to_string(),
        ));
    }

    if cfg.queue.max_backlog == Some(0) {
        return Err(TickQueueError::ConfigError(
            "[queue].max_backlog must be >= 1 when set (got 0)".to_string(),
        ));
    }

    Ok(())
}

fn validate_steps(cfg: &RawConfigFile) -> Result<()> {
    for (index, step) in cfg.step.iter().enumerate() {
        if step.label.trim().is_empty() {
            return Err(TickQueueError::ConfigError(format!(
                "step #{} has an empty `label`",
                index + 1
            )));
        }
    }
    Ok(())
}
