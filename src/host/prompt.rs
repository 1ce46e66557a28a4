// src/host/prompt.rs

//! The host's job graph ("prompt").
//!
//! A prompt maps node ids to `{ class_type, inputs }`. Inputs are free-form
//! JSON; an input that consumes another node's output is a link written as
//! `[node_id, output_index]`.

use std::collections::BTreeMap;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::errors::{FeedError, Result};
use crate::types::{NodeClass, NodeId};

/// Name of the counter input bumped on every requeue.
pub const REQUEUE_INPUT: &str = "requeue";

/// Reference to output `output` of node `node`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub node: NodeId,
    pub output: usize,
}

impl Link {
    pub fn new(node: impl Into<NodeId>, output: usize) -> Self {
        Self {
            node: node.into(),
            output,
        }
    }

    /// Parse `["<node>", <index>]`; anything else is not a link.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value.as_array()?.as_slice() {
            [Value::String(node), index] => Some(Self {
                node: node.clone(),
                output: usize::try_from(index.as_u64()?).ok()?,
            }),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        json!([self.node, self.output])
    }
}

/// One node of a prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptNode {
    pub class_type: NodeClass,
    #[serde(default)]
    pub inputs: Map<String, Value>,
}

impl PromptNode {
    pub fn new(class_type: NodeClass) -> Self {
        Self {
            class_type,
            inputs: Map::new(),
        }
    }

    pub fn with_input(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.inputs.insert(key.to_string(), value.into());
        self
    }

    /// How many times this node has been resubmitted; 0 on a fresh run.
    pub fn requeue_count(&self) -> u64 {
        self.inputs
            .get(REQUEUE_INPUT)
            .and_then(Value::as_u64)
            .unwrap_or(0)
    }

    pub fn set_requeue_count(&mut self, count: u64) {
        self.inputs.insert(REQUEUE_INPUT.to_string(), json!(count));
    }

    /// Inputs that link to other nodes, as `(input_name, link)`.
    pub fn links(&self) -> impl Iterator<Item = (&str, Link)> {
        self.inputs
            .iter()
            .filter_map(|(name, value)| Link::from_value(value).map(|link| (name.as_str(), link)))
    }
}

/// A whole job graph, ordered by node id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromptGraph {
    nodes: BTreeMap<NodeId, PromptNode>,
}

impl PromptGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<NodeId>, node: PromptNode) {
        self.nodes.insert(id.into(), node);
    }

    pub fn get(&self, id: &str) -> Option<&PromptNode> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut PromptNode> {
        self.nodes.get_mut(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PromptNode)> {
        self.nodes.iter().map(|(id, node)| (id.as_str(), node))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut PromptNode)> {
        self.nodes.iter_mut().map(|(id, node)| (id.as_str(), node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node ids ordered so that every node comes after the nodes it links to.
    ///
    /// Fails with `UnknownNode` for a dangling link and `GraphCycle` if the
    /// links form a cycle.
    pub fn execution_order(&self) -> Result<Vec<NodeId>> {
        // Edge direction: upstream -> consumer.
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

        for id in self.nodes.keys() {
            graph.add_node(id.as_str());
        }

        for (id, node) in self.nodes.iter() {
            for (input, link) in node.links() {
                let Some((upstream, _)) = self.nodes.get_key_value(&link.node) else {
                    return Err(FeedError::UnknownNode(format!(
                        "node '{}' input '{}' links to missing node '{}'",
                        id, input, link.node
                    )));
                };
                graph.add_edge(upstream.as_str(), id.as_str(), ());
            }
        }

        match toposort(&graph, None) {
            Ok(order) => Ok(order.into_iter().map(str::to_string).collect()),
            Err(cycle) => Err(FeedError::GraphCycle(format!(
                "cycle detected in prompt graph involving node '{}'",
                cycle.node_id()
            ))),
        }
    }
}
