// src/host/local.rs

use std::collections::BTreeMap;

use anyhow::anyhow;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::Result;
use crate::host::{HostBackend, PromptGraph, QueuedPrompt, RunningPrompt};

/// Minimal in-process host: a priority queue of prompts plus a
/// single-entry "currently running" table.
///
/// Fresh submissions get increasing non-negative numbers; requeues use the
/// negated counter, so they always run before anything submitted fresh.
#[derive(Debug, Default)]
pub struct LocalHost {
    queue: BTreeMap<i64, QueuedPrompt>,
    running: Vec<RunningPrompt>,
    counter: i64,
}

impl LocalHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a fresh prompt and return its prompt id.
    pub fn submit(&mut self, prompt: PromptGraph) -> Result<String> {
        let number = self.next_number();
        let prompt_id = Uuid::new_v4().to_string();
        self.enqueue(QueuedPrompt {
            number,
            prompt_id: prompt_id.clone(),
            prompt,
        })?;
        Ok(prompt_id)
    }

    /// Number of prompts waiting to run.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty() && self.running.is_empty()
    }

    /// Pop the highest-priority prompt and mark it as running.
    pub fn start_next(&mut self) -> Option<RunningPrompt> {
        let (_, next) = self.queue.pop_first()?;
        debug!(number = next.number, prompt_id = %next.prompt_id, "starting prompt");
        self.running.push(next.clone());
        Some(next)
    }

    /// Remove `prompt_id` from the running table.
    pub fn finish(&mut self, prompt_id: &str) {
        self.running.retain(|run| run.prompt_id != prompt_id);
        debug!(prompt_id, "finished prompt");
    }
}

impl HostBackend for LocalHost {
    fn currently_running(&self) -> &[RunningPrompt] {
        &self.running
    }

    fn next_number(&mut self) -> i64 {
        let number = self.counter;
        self.counter += 1;
        number
    }

    fn enqueue(&mut self, prompt: QueuedPrompt) -> Result<()> {
        if self.queue.contains_key(&prompt.number) {
            return Err(anyhow!("queue number {} is already taken", prompt.number).into());
        }
        info!(number = prompt.number, prompt_id = %prompt.prompt_id, "queued prompt");
        self.queue.insert(prompt.number, prompt);
        Ok(())
    }
}
