// src/batch/manager.rs

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::types::NodeId;

/// Shared batching policy for a group of incremental loaders.
///
/// Every loader wired to the same manager pulls `frames_per_batch` images per
/// round and votes on requeue under the manager's `unique_id`, so the group
/// advances in lockstep and stops with its shortest feed.
#[derive(Debug, Clone)]
pub struct BatchManager {
    unique_id: NodeId,
    frames_per_batch: usize,
    /// Minimum total over participating cursors; `None` until one registers.
    total_frames: Option<usize>,
    /// Registry keys of the cursors fed through this manager.
    inputs: BTreeSet<NodeId>,
    has_closed_inputs: bool,
}

impl BatchManager {
    pub fn new(unique_id: impl Into<NodeId>, frames_per_batch: usize) -> Self {
        Self {
            unique_id: unique_id.into(),
            frames_per_batch: frames_per_batch.max(1),
            total_frames: None,
            inputs: BTreeSet::new(),
            has_closed_inputs: false,
        }
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn set_unique_id(&mut self, unique_id: impl Into<NodeId>) {
        self.unique_id = unique_id.into();
    }

    pub fn frames_per_batch(&self) -> usize {
        self.frames_per_batch
    }

    pub fn set_frames_per_batch(&mut self, frames_per_batch: usize) {
        self.frames_per_batch = frames_per_batch.max(1);
    }

    pub fn total_frames(&self) -> Option<usize> {
        self.total_frames
    }

    pub fn has_closed_inputs(&self) -> bool {
        self.has_closed_inputs
    }

    pub fn inputs(&self) -> impl Iterator<Item = &str> {
        self.inputs.iter().map(String::as_str)
    }

    pub fn is_tracking(&self, run_id: &str) -> bool {
        self.inputs.contains(run_id)
    }

    /// Number of rounds needed for the shortest feed, if known.
    pub fn num_batches(&self) -> Option<usize> {
        self.total_frames
            .map(|total| total.div_ceil(self.frames_per_batch))
    }

    /// Add a participating cursor and fold its length into `total_frames`.
    pub fn register(&mut self, run_id: &str, total_frames: usize) {
        if self.inputs.insert(run_id.to_string()) {
            debug!(
                manager = %self.unique_id,
                run_id,
                total_frames,
                "registered input with batch manager"
            );
        }
        self.total_frames = Some(match self.total_frames {
            Some(current) => current.min(total_frames),
            None => total_frames,
        });
    }

    /// Mark `run_id` as drained. Any closed input ends the group's run.
    pub fn close_input(&mut self, run_id: &str) {
        self.inputs.remove(run_id);
        if !self.has_closed_inputs {
            info!(manager = %self.unique_id, run_id, "batch manager input closed");
        }
        self.has_closed_inputs = true;
    }

    /// Stop tracking `run_id` without closing the group (its cursor is gone
    /// for reasons other than exhaustion).
    pub fn forget_input(&mut self, run_id: &str) {
        self.inputs.remove(run_id);
    }

    /// Forget per-run state, keeping `frames_per_batch` and `unique_id`.
    ///
    /// Returns the inputs that were still tracked so the caller can drop
    /// their cursors.
    pub fn reset(&mut self) -> Vec<NodeId> {
        let drained: Vec<NodeId> = std::mem::take(&mut self.inputs).into_iter().collect();
        self.has_closed_inputs = false;
        self.total_frames = None;
        debug!(manager = %self.unique_id, dropped = drained.len(), "batch manager reset");
        drained
    }
}
