// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    /// Folder missing, or no file survived the extension filter.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A single image could not be read or decoded.
    ///
    /// The image sequence logs and skips these; they only surface when a
    /// caller decodes a file directly.
    #[error("Failed to decode {path:?}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unknown node: {0}")]
    UnknownNode(String),

    #[error("Cycle detected in prompt graph: {0}")]
    GraphCycle(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Tensor error: {0}")]
    TensorError(#[from] candle_core::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, FeedError>;
