// src/engine/mod.rs

//! Prompt execution engine for folderfeed.
//!
//! This module ties together:
//! - the node context (cursors, managers, requeue votes)
//! - the local host queue
//! - the main runtime loop that reacts to:
//!   - prompt submissions
//!   - shutdown signals
//!
//! The synchronous core that executes one prompt lives in [`core`]; the
//! async/IO shell is implemented in [`runtime`].

use crate::host::PromptGraph;
use crate::requeue::Report;
use crate::types::{NodeClass, NodeId};

/// Runtime options used by the async shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// Exit once the host queue is empty instead of waiting for more
    /// submissions.
    pub exit_when_idle: bool,
    /// Stop after this many prompt rounds.
    pub max_rounds: Option<usize>,
}

/// Events flowing into the runtime.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// Queue a fresh prompt.
    PromptSubmitted(PromptGraph),
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

/// What one node did during a round.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeReport {
    pub node: NodeId,
    pub class: NodeClass,
    /// Output reused from an earlier round without invoking the node.
    pub cached: bool,
    /// `(batch, height, width)` of the image output, if any.
    pub shape: Option<(usize, usize, usize)>,
    /// Total frame count reported by an incremental loader.
    pub frame_count: Option<usize>,
    /// Requeue vote outcome for incremental loaders.
    pub vote: Option<Report>,
}

/// Summary of one executed prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundReport {
    pub round: usize,
    pub prompt_id: String,
    pub number: i64,
    pub nodes: Vec<NodeReport>,
    /// Prompt id of the requeue issued during this round.
    pub requeued: Option<String>,
}

/// Totals over a whole runtime session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub rounds: usize,
    pub requeues: usize,
}

pub mod core;
pub mod runtime;

pub use self::core::EngineCore;
pub use runtime::Runtime;
