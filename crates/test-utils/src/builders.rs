#![allow(dead_code)]

use tickqueue::config::{ConfigFile, QueueSection, RawConfigFile, StepConfig};
use tickqueue::OverflowBehaviour;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                queue: QueueSection::default(),
                step: Vec::new(),
            },
        }
    }

    pub fn with_interval_ms(mut self, ms: u64) -> Self {
        self.config.queue.interval_ms = ms;
        self
    }

    pub fn with_max_backlog(mut self, n: usize) -> Self {
        self.config.queue.max_backlog = Some(n);
        self
    }

    pub fn with_overflow(mut self, overflow: OverflowBehaviour) -> Self {
        self.config.queue.overflow = overflow;
        self
    }

    /// Add a deferred step.
    pub fn step(mut self, label: &str) -> Self {
        self.config.step.push(StepConfig {
            label: label.to_string(),
            immediate: false,
        });
        self
    }

    /// Add an immediate step.
    pub fn immediate_step(mut self, label: &str) -> Self {
        self.config.step.push(StepConfig {
            label: label.to_string(),
            immediate: true,
        });
        self
    }

    /// The unvalidated config, for exercising validation.
    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
