// src/engine/core.rs

//! Synchronous prompt executor.
//!
//! [`EngineCore`] runs one prompt to completion against a [`HostBackend`]:
//! nodes execute in link order, and a node whose change token matches the
//! previous round reuses its cached output instead of running again.
//!
//! It has no channels and no Tokio types, so it can be driven directly from
//! tests with a fake host.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::engine::{NodeReport, RoundReport};
use crate::errors::{FeedError, Result};
use crate::host::{HostBackend, RunningPrompt};
use crate::node::{NodeContext, NodeOutput, change_token, invoke};
use crate::requeue::Report;
use crate::types::{ChangeToken, NodeClass, NodeId};

#[derive(Debug)]
struct CachedOutput {
    class: NodeClass,
    token: ChangeToken,
    output: NodeOutput,
}

/// Executes prompts and keeps the state that spans rounds.
#[derive(Debug, Default)]
pub struct EngineCore {
    ctx: NodeContext,
    cache: HashMap<NodeId, CachedOutput>,
    rounds: usize,
}

impl EngineCore {
    pub fn new(ctx: NodeContext) -> Self {
        Self {
            ctx,
            cache: HashMap::new(),
            rounds: 0,
        }
    }

    pub fn context(&self) -> &NodeContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut NodeContext {
        &mut self.ctx
    }

    /// Number of prompts executed so far.
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Last output of node `id`, if it has run.
    pub fn output(&self, id: &str) -> Option<&NodeOutput> {
        self.cache.get(id).map(|cached| &cached.output)
    }

    /// Execute `run`, which must be the prompt the host reports as running.
    pub fn execute<H>(&mut self, host: &mut H, run: &RunningPrompt) -> Result<RoundReport>
    where
        H: HostBackend + ?Sized,
    {
        let evicted = self.ctx.evict_idle();
        if !evicted.is_empty() {
            info!(evicted = evicted.len(), "evicted idle cursors");
        }

        let order = run.prompt.execution_order()?;
        self.rounds += 1;
        debug!(
            round = self.rounds,
            prompt_id = %run.prompt_id,
            number = run.number,
            ?order,
            "executing prompt"
        );

        let mut nodes = Vec::with_capacity(order.len());
        let mut requeued = None;

        for id in order {
            let node = run.prompt.get(&id).ok_or_else(|| {
                FeedError::UnknownNode(format!("node '{}' vanished from prompt", id))
            })?;
            let token = change_token(node);

            let reuse = self
                .cache
                .get(&id)
                .is_some_and(|cached| cached.class == node.class_type && cached.token == token);

            if !reuse {
                let output = invoke(&mut self.ctx, host, &id, node)?;
                self.cache.insert(
                    id.clone(),
                    CachedOutput {
                        class: node.class_type,
                        token,
                        output,
                    },
                );
            } else {
                debug!(node = %id, "node unchanged; reusing cached output");
            }

            let Some(cached) = self.cache.get(&id) else {
                continue;
            };
            let report = node_report(&id, cached, reuse);
            if let Some(Report::Requeued { prompt_id, .. }) = &report.vote {
                requeued = Some(prompt_id.clone());
            }
            nodes.push(report);
        }

        Ok(RoundReport {
            round: self.rounds,
            prompt_id: run.prompt_id.clone(),
            number: run.number,
            nodes,
            requeued,
        })
    }
}

fn node_report(id: &str, cached: &CachedOutput, reused: bool) -> NodeReport {
    let shape = cached
        .output
        .batch()
        .map(|batch| (batch.len(), batch.height(), batch.width()));
    let (frame_count, vote) = match &cached.output {
        NodeOutput::Incremental(output) => (Some(output.frame_count), Some(output.report.clone())),
        _ => (None, None),
    };

    NodeReport {
        node: id.to_string(),
        class: cached.class,
        cached: reused,
        shape,
        frame_count,
        vote,
    }
}
