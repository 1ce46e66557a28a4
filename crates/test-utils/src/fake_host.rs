use folderfeed::errors::Result;
use folderfeed::host::{HostBackend, PromptGraph, QueuedPrompt, RunningPrompt};

/// A fake host that:
/// - reports whatever running table the test sets up
/// - records every enqueued prompt instead of executing it.
#[derive(Debug, Default)]
pub struct FakeHost {
    running: Vec<RunningPrompt>,
    enqueued: Vec<QueuedPrompt>,
    counter: i64,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host with `prompt` as its single running prompt.
    pub fn running(prompt: PromptGraph) -> Self {
        let mut host = Self::new();
        let number = host.next_number();
        host.running.push(QueuedPrompt {
            number,
            prompt_id: format!("prompt-{number}"),
            prompt,
        });
        host
    }

    pub fn set_running(&mut self, running: Vec<RunningPrompt>) {
        self.running = running;
    }

    pub fn running_prompts(&self) -> &[RunningPrompt] {
        &self.running
    }

    pub fn enqueued(&self) -> &[QueuedPrompt] {
        &self.enqueued
    }

    /// Start the lowest-numbered enqueued prompt as the only running one,
    /// the way a host moves on to the next round.
    pub fn start_next(&mut self) -> Option<RunningPrompt> {
        let index = self
            .enqueued
            .iter()
            .enumerate()
            .min_by_key(|(_, prompt)| prompt.number)
            .map(|(index, _)| index)?;
        let next = self.enqueued.remove(index);
        self.running = vec![next.clone()];
        Some(next)
    }
}

impl HostBackend for FakeHost {
    fn currently_running(&self) -> &[RunningPrompt] {
        &self.running
    }

    fn next_number(&mut self) -> i64 {
        let number = self.counter;
        self.counter += 1;
        number
    }

    fn enqueue(&mut self, prompt: QueuedPrompt) -> Result<()> {
        self.enqueued.push(prompt);
        Ok(())
    }
}
