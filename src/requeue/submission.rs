// src/requeue/submission.rs

use tracing::debug;
use uuid::Uuid;

use crate::host::{HostBackend, PromptGraph, QueuedPrompt, RunningPrompt};

/// Increment the `requeue` counter of every node that tracks it.
///
/// The counter makes the resubmitted inputs differ from the previous round,
/// so an output cache cannot serve the batch manager from the last run.
/// Returns the number of nodes touched.
pub fn bump_requeue_counters(prompt: &mut PromptGraph) -> usize {
    let mut bumped = 0;
    for (id, node) in prompt.iter_mut() {
        if node.class_type.tracks_requeue() {
            let next = node.requeue_count() + 1;
            node.set_requeue_count(next);
            debug!(node = id, requeue = next, "bumped requeue counter");
            bumped += 1;
        }
    }
    bumped
}

/// Build the resubmission of `running`.
///
/// The copy gets a fresh prompt id and a negative queue number taken from
/// the host counter, which places it ahead of every fresh submission.
pub fn build_requeue<H>(host: &mut H, running: &RunningPrompt) -> QueuedPrompt
where
    H: HostBackend + ?Sized,
{
    let mut prompt = running.prompt.clone();
    bump_requeue_counters(&mut prompt);

    QueuedPrompt {
        number: -host.next_number(),
        prompt_id: Uuid::new_v4().to_string(),
        prompt,
    }
}
