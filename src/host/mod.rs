// src/host/mod.rs

//! Boundary to the workflow host that executes prompts.
//!
//! Nodes never talk to a concrete host. They see a [`HostBackend`], which
//! exposes just what the requeue protocol needs:
//! - the table of prompts currently executing
//! - a monotonic queue counter
//! - a way to put a prompt back on the queue
//!
//! [`LocalHost`] is the in-process implementation driven by the `folderfeed`
//! runtime; tests provide their own fakes.

pub mod local;
pub mod prompt;

pub use local::LocalHost;
pub use prompt::{Link, PromptGraph, PromptNode, REQUEUE_INPUT};

use crate::errors::Result;

/// A prompt with its queue position and submission identity.
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedPrompt {
    /// Queue priority; lower numbers run first.
    pub number: i64,
    /// Unique per submission, so a requeued graph is a new job.
    pub prompt_id: String,
    pub prompt: PromptGraph,
}

/// Entries of the host's "currently running" table.
pub type RunningPrompt = QueuedPrompt;

/// What the requeue protocol needs from a workflow host.
pub trait HostBackend {
    /// Prompts the host is executing right now.
    ///
    /// The requeue protocol only acts when this holds exactly one entry.
    fn currently_running(&self) -> &[RunningPrompt];

    /// Take the next value of the host's monotonic queue counter.
    fn next_number(&mut self) -> i64;

    /// Put a prompt on the host queue.
    fn enqueue(&mut self, prompt: QueuedPrompt) -> Result<()>;
}
