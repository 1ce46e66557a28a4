// src/config/model.rs

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::errors::Result;
use crate::host::{PromptGraph, PromptNode};
use crate::types::{NodeClass, NodeId};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [config]
/// cursor_ttl_secs = 600
/// max_rounds = 100
///
/// [node.manager]
/// class = "BatchManager"
/// frames_per_batch = 4
///
/// [node.frames]
/// class = "LoadImagesFromFolderIncremental"
/// folder_path = "./frames"
/// meta_batch = ["manager", 0]
/// ```
///
/// Use [`ConfigFile`] once the raw file has been validated.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    /// All nodes from `[node.<id>]`, keyed by node id.
    #[serde(default)]
    pub node: BTreeMap<NodeId, NodeConfig>,
}

/// `[config]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigSection {
    /// Evict cursors not touched for this many seconds.
    ///
    /// Unset keeps cursors until their run finishes or is reset.
    #[serde(default)]
    pub cursor_ttl_secs: Option<u64>,

    /// Stop after this many prompt rounds; unset runs until the queue drains.
    #[serde(default)]
    pub max_rounds: Option<usize>,
}

impl ConfigSection {
    pub fn cursor_ttl(&self) -> Option<Duration> {
        self.cursor_ttl_secs.map(Duration::from_secs)
    }
}

/// `[node.<id>]` section.
///
/// `class` picks the node class; every other key is passed to the node as an
/// input. Links are written as `["<node id>", <output index>]`.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
    pub class: NodeClass,

    #[serde(flatten)]
    pub inputs: BTreeMap<String, toml::Value>,
}

impl NodeConfig {
    /// Convert into a prompt node, translating TOML values to JSON.
    pub fn to_prompt_node(&self) -> Result<PromptNode> {
        let mut node = PromptNode::new(self.class);
        for (key, value) in &self.inputs {
            node.inputs
                .insert(key.clone(), serde_json::to_value(value)?);
        }
        Ok(node)
    }
}

/// A validated configuration.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub node: BTreeMap<NodeId, NodeConfig>,
    prompt: PromptGraph,
}

impl ConfigFile {
    /// Build without validation; `TryFrom<RawConfigFile>` is the checked path.
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        node: BTreeMap<NodeId, NodeConfig>,
        prompt: PromptGraph,
    ) -> Self {
        Self {
            config,
            node,
            prompt,
        }
    }

    /// The prompt graph submitted for the first round.
    pub fn prompt(&self) -> &PromptGraph {
        &self.prompt
    }
}

impl RawConfigFile {
    /// Translate every node into a prompt graph. Links are not checked here.
    pub fn to_prompt(&self) -> Result<PromptGraph> {
        let mut prompt = PromptGraph::new();
        for (id, node) in &self.node {
            prompt.insert(id.clone(), node.to_prompt_node()?);
        }
        Ok(prompt)
    }
}
