#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::Path;

use folderfeed::config::{ConfigFile, ConfigSection, NodeConfig, RawConfigFile};
use folderfeed::host::{Link, PromptGraph, PromptNode};
use folderfeed::types::NodeClass;
use serde_json::json;

/// Builder for `PromptGraph` to simplify test setup.
pub struct PromptBuilder {
    prompt: PromptGraph,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self {
            prompt: PromptGraph::new(),
        }
    }

    pub fn with_node(mut self, id: &str, node: PromptNode) -> Self {
        self.prompt.insert(id, node);
        self
    }

    /// Indexed `LoadImagesFromFolder`.
    pub fn folder(self, id: &str, folder: &Path, batch_index: usize, batch_size: usize) -> Self {
        self.with_node(
            id,
            PromptNode::new(NodeClass::LoadImagesFromFolder)
                .with_input("folder_path", folder.to_string_lossy().into_owned())
                .with_input("batch_index", json!(batch_index))
                .with_input("batch_size", json!(batch_size)),
        )
    }

    /// Unmanaged `LoadImagesFromFolderIncremental`.
    pub fn incremental(self, id: &str, folder: &Path, batch_size: usize) -> Self {
        self.with_node(
            id,
            PromptNode::new(NodeClass::LoadImagesFromFolderIncremental)
                .with_input("folder_path", folder.to_string_lossy().into_owned())
                .with_input("batch_size", json!(batch_size))
                .with_input("requeue", json!(0)),
        )
    }

    /// `LoadImagesFromFolderIncremental` linked to batch manager `manager`.
    pub fn managed(self, id: &str, folder: &Path, manager: &str) -> Self {
        self.with_node(
            id,
            PromptNode::new(NodeClass::LoadImagesFromFolderIncremental)
                .with_input("folder_path", folder.to_string_lossy().into_owned())
                .with_input("meta_batch", Link::new(manager, 0).to_value())
                .with_input("requeue", json!(0)),
        )
    }

    pub fn manager(self, id: &str, frames_per_batch: usize) -> Self {
        self.with_node(
            id,
            PromptNode::new(NodeClass::BatchManager)
                .with_input("frames_per_batch", json!(frames_per_batch))
                .with_input("requeue", json!(0)),
        )
    }

    pub fn build(self) -> PromptGraph {
        self.prompt
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `ConfigFile`.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                node: BTreeMap::new(),
            },
        }
    }

    pub fn with_node(mut self, id: &str, node: NodeConfig) -> Self {
        self.config.node.insert(id.to_string(), node);
        self
    }

    pub fn with_cursor_ttl_secs(mut self, secs: u64) -> Self {
        self.config.config.cursor_ttl_secs = Some(secs);
        self
    }

    pub fn with_max_rounds(mut self, rounds: usize) -> Self {
        self.config.config.max_rounds = Some(rounds);
        self
    }

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

/// Builder for `NodeConfig`.
pub struct NodeConfigBuilder {
    node: NodeConfig,
}

impl NodeConfigBuilder {
    pub fn new(class: NodeClass) -> Self {
        Self {
            node: NodeConfig {
                class,
                inputs: BTreeMap::new(),
            },
        }
    }

    pub fn input(mut self, key: &str, value: impl Into<toml::Value>) -> Self {
        self.node.inputs.insert(key.to_string(), value.into());
        self
    }

    pub fn folder_path(self, folder: &Path) -> Self {
        self.input("folder_path", folder.to_string_lossy().into_owned())
    }

    pub fn link(self, key: &str, node: &str) -> Self {
        let link = toml::Value::Array(vec![
            toml::Value::String(node.to_string()),
            toml::Value::Integer(0),
        ]);
        self.input(key, link)
    }

    pub fn build(self) -> NodeConfig {
        self.node
    }
}
