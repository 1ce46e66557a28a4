// src/node/inputs.rs

//! Typed views over a prompt node's JSON inputs.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::{FeedError, Result};
use crate::host::PromptNode;
use crate::types::NodeId;

pub const MAX_BATCH_INDEX: usize = 999_999;
pub const MAX_BATCH_SIZE: usize = 64;
pub const MAX_FRAMES_PER_BATCH: usize = 10_000;

fn default_batch_size() -> usize {
    1
}

fn default_sort() -> bool {
    true
}

/// Inputs of `LoadImagesFromFolder`.
#[derive(Debug, Clone, Deserialize)]
pub struct FolderInputs {
    pub folder_path: String,
    #[serde(default)]
    pub batch_index: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_sort")]
    pub sort: bool,
}

/// Inputs of `LoadImagesFromFolderIncremental`.
#[derive(Debug, Clone, Deserialize)]
pub struct IncrementalInputs {
    pub folder_path: String,
    #[serde(default = "default_sort")]
    pub sort: bool,
    /// Images per round when no batch manager is linked.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Link `[manager_id, 0]` to a `BatchManager` node.
    #[serde(default)]
    pub meta_batch: Option<(NodeId, usize)>,
    #[serde(default)]
    pub requeue: u64,
}

impl IncrementalInputs {
    pub fn manager_id(&self) -> Option<&str> {
        self.meta_batch.as_ref().map(|(id, _)| id.as_str())
    }
}

/// Inputs of `BatchManager`.
#[derive(Debug, Clone, Deserialize)]
pub struct ManagerInputs {
    #[serde(default = "default_batch_size")]
    pub frames_per_batch: usize,
    #[serde(default)]
    pub requeue: u64,
}

/// Parse and range-check the inputs of node `id`.
pub fn parse_inputs<T>(id: &str, node: &PromptNode) -> Result<T>
where
    T: DeserializeOwned + CheckInputs,
{
    let parsed: T = serde_json::from_value(Value::Object(node.inputs.clone())).map_err(|e| {
        FeedError::ConfigError(format!(
            "node '{}' ({}): invalid inputs: {}",
            id, node.class_type, e
        ))
    })?;
    parsed.check(id)?;
    Ok(parsed)
}

/// Range checks applied after deserialization.
pub trait CheckInputs {
    fn check(&self, id: &str) -> Result<()>;
}

fn check_range(id: &str, name: &str, value: usize, min: usize, max: usize) -> Result<()> {
    if value < min || value > max {
        return Err(FeedError::ConfigError(format!(
            "node '{}': `{}` must be in {}..={} (got {})",
            id, name, min, max, value
        )));
    }
    Ok(())
}

impl CheckInputs for FolderInputs {
    fn check(&self, id: &str) -> Result<()> {
        check_range(id, "batch_index", self.batch_index, 0, MAX_BATCH_INDEX)?;
        check_range(id, "batch_size", self.batch_size, 1, MAX_BATCH_SIZE)
    }
}

impl CheckInputs for IncrementalInputs {
    fn check(&self, id: &str) -> Result<()> {
        check_range(id, "batch_size", self.batch_size, 1, MAX_BATCH_SIZE)
    }
}

impl CheckInputs for ManagerInputs {
    fn check(&self, id: &str) -> Result<()> {
        check_range(
            id,
            "frames_per_batch",
            self.frames_per_batch,
            1,
            MAX_FRAMES_PER_BATCH,
        )
    }
}
