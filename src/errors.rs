// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TickQueueError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// A promise was resolved after it had already settled.
    #[error("promise already settled; refusing to resolve it again")]
    AlreadySettled,

    /// A promise was abandoned before it produced a value.
    #[error("promise abandoned before it was resolved")]
    Abandoned,

    #[error("backlog is full ({capacity} pending tasks)")]
    BacklogFull { capacity: usize },

    #[error("task queue has been stopped")]
    Stopped,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TickQueueError>;
