// src/node/context.rs

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use tracing::info;

use crate::batch::{BatchManager, CursorRegistry};
use crate::requeue::RequeueCoordinator;
use crate::types::NodeId;

/// State that must outlive a single node invocation.
///
/// The host adapter owns one of these and lends it `&mut` to every
/// invocation, so the registry and vote state are only ever touched by the
/// invocation currently running. A host that runs nodes on several threads
/// has to put the context behind a mutex.
#[derive(Debug, Default)]
pub struct NodeContext {
    pub registry: CursorRegistry,
    pub managers: HashMap<NodeId, BatchManager>,
    pub coordinator: RequeueCoordinator,
    /// Loaders whose folder ran out during the current run. A requeued
    /// round must not reopen them.
    drained: HashSet<NodeId>,
    cursor_ttl: Option<Duration>,
}

impl NodeContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evict cursors left idle for `ttl` when [`Self::evict_idle`] runs.
    pub fn with_cursor_ttl(mut self, ttl: Duration) -> Self {
        self.cursor_ttl = Some(ttl);
        self
    }

    pub fn cursor_ttl(&self) -> Option<Duration> {
        self.cursor_ttl
    }

    pub fn manager(&self, id: &str) -> Option<&BatchManager> {
        self.managers.get(id)
    }

    pub fn is_drained(&self, run_id: &str) -> bool {
        self.drained.contains(run_id)
    }

    pub fn mark_drained(&mut self, run_id: &str) {
        self.drained.insert(run_id.to_string());
    }

    /// Forget that `run_id` drained; returns whether it had.
    pub fn clear_drained(&mut self, run_id: &str) -> bool {
        self.drained.remove(run_id)
    }

    /// Drop cursors abandoned by runs that never finished.
    ///
    /// No-op unless a TTL was configured.
    pub fn evict_idle(&mut self) -> Vec<NodeId> {
        let Some(ttl) = self.cursor_ttl else {
            return Vec::new();
        };

        let evicted = self.registry.evict_idle(ttl);
        for run_id in &evicted {
            for manager in self.managers.values_mut() {
                manager.forget_input(run_id);
            }
        }
        evicted
    }

    /// Drop every cursor, manager and vote.
    pub fn reset(&mut self) {
        info!(
            cursors = self.registry.len(),
            managers = self.managers.len(),
            "resetting node context"
        );
        self.registry.clear();
        self.managers.clear();
        self.drained.clear();
        self.coordinator.reset();
    }
}
