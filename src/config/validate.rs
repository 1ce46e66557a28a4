// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{FeedError, Result};
use crate::host::PromptGraph;
use crate::node::{FolderInputs, IncrementalInputs, ManagerInputs, parse_inputs};
use crate::types::NodeClass;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = FeedError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let prompt = validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.node, prompt))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<PromptGraph> {
    ensure_has_nodes(cfg)?;
    validate_global_config(cfg)?;
    let prompt = cfg.to_prompt()?;
    validate_links(&prompt)?;
    prompt.execution_order()?;
    validate_inputs(&prompt)?;
    Ok(prompt)
}

fn ensure_has_nodes(cfg: &RawConfigFile) -> Result<()> {
    if cfg.node.is_empty() {
        return Err(FeedError::ConfigError(
            "config must contain at least one [node.<id>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    if cfg.config.cursor_ttl_secs == Some(0) {
        return Err(FeedError::ConfigError(
            "[config].cursor_ttl_secs must be >= 1 (got 0)".to_string(),
        ));
    }
    if cfg.config.max_rounds == Some(0) {
        return Err(FeedError::ConfigError(
            "[config].max_rounds must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

/// Every link must name an existing node, and `meta_batch` must come from a
/// `BatchManager`.
fn validate_links(prompt: &PromptGraph) -> Result<()> {
    for (id, node) in prompt.iter() {
        for (input, link) in node.links() {
            let Some(target) = prompt.get(&link.node) else {
                return Err(FeedError::UnknownNode(format!(
                    "node '{}' links input `{}` to unknown node '{}'",
                    id, input, link.node
                )));
            };
            if link.node == id {
                return Err(FeedError::ConfigError(format!(
                    "node '{}' cannot link to itself in `{}`",
                    id, input
                )));
            }
            if input == "meta_batch" && target.class_type != NodeClass::BatchManager {
                return Err(FeedError::ConfigError(format!(
                    "node '{}': `meta_batch` must link to a BatchManager, '{}' is {}",
                    id, link.node, target.class_type
                )));
            }
        }
    }
    Ok(())
}

fn validate_inputs(prompt: &PromptGraph) -> Result<()> {
    for (id, node) in prompt.iter() {
        match node.class_type {
            NodeClass::LoadImagesFromFolder => {
                parse_inputs::<FolderInputs>(id, node)?;
            }
            NodeClass::LoadImagesFromFolderIncremental => {
                parse_inputs::<IncrementalInputs>(id, node)?;
            }
            NodeClass::BatchManager => {
                parse_inputs::<ManagerInputs>(id, node)?;
            }
        }
    }
    Ok(())
}
