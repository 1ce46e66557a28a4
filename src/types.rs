use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identity of one node instance within a prompt graph.
///
/// Hosts hand this to every invocation as the hidden `unique_id`; it stays
/// stable across requeued rounds of the same graph, which is what lets a
/// cursor survive between invocations.
pub type NodeId = String;

/// Node classes this crate knows how to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeClass {
    /// Random-access window over a folder (`batch_index` * `batch_size`).
    LoadImagesFromFolder,
    /// Stateful loader that emits the next batch on every round and asks the
    /// host to requeue until the folder is drained.
    LoadImagesFromFolderIncremental,
    /// Shared frames-per-batch setting for incremental loaders.
    BatchManager,
}

impl NodeClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeClass::LoadImagesFromFolder => "LoadImagesFromFolder",
            NodeClass::LoadImagesFromFolderIncremental => "LoadImagesFromFolderIncremental",
            NodeClass::BatchManager => "BatchManager",
        }
    }

    /// Classes whose instances vote in the requeue quorum.
    pub fn votes_on_requeue(&self) -> bool {
        matches!(self, NodeClass::LoadImagesFromFolderIncremental)
    }

    /// Classes whose `requeue` input is bumped on resubmission.
    pub fn tracks_requeue(&self) -> bool {
        matches!(
            self,
            NodeClass::LoadImagesFromFolderIncremental | NodeClass::BatchManager
        )
    }
}

impl fmt::Display for NodeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "LoadImagesFromFolder" => Ok(NodeClass::LoadImagesFromFolder),
            "LoadImagesFromFolderIncremental" => Ok(NodeClass::LoadImagesFromFolderIncremental),
            "BatchManager" => Ok(NodeClass::BatchManager),
            other => Err(format!(
                "unknown node class: {other} (expected \"LoadImagesFromFolder\", \
                 \"LoadImagesFromFolderIncremental\" or \"BatchManager\")"
            )),
        }
    }
}

/// Change-detection signal reported to the output cache.
///
/// `Always` never compares equal to anything, itself included, so nodes that
/// report it are re-executed on every round instead of being served from
/// the cache.
#[derive(Debug, Clone)]
pub enum ChangeToken {
    Always,
    Inputs(Value),
}

impl PartialEq for ChangeToken {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ChangeToken::Inputs(a), ChangeToken::Inputs(b)) => a == b,
            _ => false,
        }
    }
}
