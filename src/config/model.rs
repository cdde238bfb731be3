// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::engine::QueueOptions;
use crate::types::OverflowBehaviour;

/// Script file as read from TOML, before validation.
///
/// ```toml
/// [queue]
/// interval_ms = 200
/// max_backlog = 16
/// overflow = "reject"
///
/// [[step]]
/// label = "A"
///
/// [[step]]
/// label = "B"
/// immediate = true
/// ```
///
/// `[queue]` is optional and has reasonable defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    /// Queue behaviour from `[queue]`.
    #[serde(default)]
    pub queue: QueueSection,

    /// Steps from `[[step]]`, in file order.
    #[serde(default)]
    pub step: Vec<StepConfig>,
}

/// Validated script. Build one with `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub queue: QueueSection,
    pub step: Vec<StepConfig>,
}

impl ConfigFile {
    /// Wrap already-validated sections.
    pub(crate) fn new_unchecked(queue: QueueSection, step: Vec<StepConfig>) -> Self {
        Self { queue, step }
    }
}

/// `[queue]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct QueueSection {
    /// Milliseconds between drain ticks. Must be >= 1.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Maximum number of pending deferred tasks; unbounded when absent.
    #[serde(default)]
    pub max_backlog: Option<usize>,

    /// `"reject"` (default) or `"drop_oldest"`.
    #[serde(default)]
    pub overflow: OverflowBehaviour,
}

fn default_interval_ms() -> u64 {
    200
}

impl Default for QueueSection {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            max_backlog: None,
            overflow: OverflowBehaviour::default(),
        }
    }
}

impl QueueSection {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Queue options described by this section.
    pub fn options(&self) -> QueueOptions {
        QueueOptions {
            interval: self.interval(),
            max_backlog: self.max_backlog,
            overflow: self.overflow,
        }
    }
}

/// `[[step]]` entry: one action to submit.
#[derive(Debug, Clone, Deserialize)]
pub struct StepConfig {
    /// Text appended to the journal when the step runs.
    pub label: String,

    /// Run ahead of the backlog instead of waiting for a drain tick.
    #[serde(default)]
    pub immediate: bool,
}
