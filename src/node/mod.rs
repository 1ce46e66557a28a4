// src/node/mod.rs

//! Node invocation surface.
//!
//! A host calls [`invoke`] once per node per prompt round, passing the node
//! id as the hidden run identity. Everything that has to survive between
//! rounds lives in the [`NodeContext`] the caller lends in.

pub mod context;
pub mod folder;
pub mod incremental;
pub mod inputs;
pub mod manager_node;

pub use context::NodeContext;
pub use folder::load_window;
pub use incremental::{IncrementalOutput, load_next};
pub use inputs::{FolderInputs, IncrementalInputs, ManagerInputs, parse_inputs};
pub use manager_node::update_manager;

use serde_json::Value;

use crate::batch::ImageBatch;
use crate::errors::Result;
use crate::host::{HostBackend, PromptNode};
use crate::types::{ChangeToken, NodeClass, NodeId};

/// What a node produced this round.
#[derive(Debug, Clone)]
pub enum NodeOutput {
    Images(ImageBatch),
    Incremental(IncrementalOutput),
    /// Reference to the manager stored in the context.
    Manager(NodeId),
}

impl NodeOutput {
    /// The image batch, for nodes that produce one.
    pub fn batch(&self) -> Option<&ImageBatch> {
        match self {
            NodeOutput::Images(batch) => Some(batch),
            NodeOutput::Incremental(output) => Some(&output.batch),
            NodeOutput::Manager(_) => None,
        }
    }
}

/// Run node `id` once.
pub fn invoke<H>(
    ctx: &mut NodeContext,
    host: &mut H,
    id: &str,
    node: &PromptNode,
) -> Result<NodeOutput>
where
    H: HostBackend + ?Sized,
{
    match node.class_type {
        NodeClass::LoadImagesFromFolder => {
            let inputs: FolderInputs = parse_inputs(id, node)?;
            Ok(NodeOutput::Images(load_window(&inputs)?))
        }
        NodeClass::LoadImagesFromFolderIncremental => {
            let inputs: IncrementalInputs = parse_inputs(id, node)?;
            Ok(NodeOutput::Incremental(load_next(ctx, host, id, &inputs)?))
        }
        NodeClass::BatchManager => {
            let inputs: ManagerInputs = parse_inputs(id, node)?;
            Ok(NodeOutput::Manager(update_manager(ctx, id, &inputs)))
        }
    }
}

/// Change-detection signal for the host's output cache.
///
/// Folder loaders always re-run: the folder may have changed and the
/// incremental loader is stateful. The batch manager is keyed by its
/// inputs, which change every round through the `requeue` counter; on a
/// fresh submission (`requeue == 0`) it always runs so the reset happens.
pub fn change_token(node: &PromptNode) -> ChangeToken {
    match node.class_type {
        NodeClass::LoadImagesFromFolder | NodeClass::LoadImagesFromFolderIncremental => {
            ChangeToken::Always
        }
        NodeClass::BatchManager if node.requeue_count() == 0 => ChangeToken::Always,
        NodeClass::BatchManager => ChangeToken::Inputs(Value::Object(node.inputs.clone())),
    }
}
