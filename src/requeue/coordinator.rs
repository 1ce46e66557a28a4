// src/requeue/coordinator.rs

use tracing::{info, warn};

use crate::errors::Result;
use crate::host::HostBackend;
use crate::requeue::guard::{RequeueGuard, VoteOutcome, voters};
use crate::requeue::submission::build_requeue;

/// What happened to a reported vote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// The host did not have exactly one running prompt; nothing recorded.
    Ignored { running: usize },
    /// Recorded; waiting for the rest of the round.
    Pending { cast: usize, required: usize },
    /// Quorum reached with pending work; the prompt was requeued.
    Requeued { prompt_id: String, number: i64 },
    /// Quorum reached and nothing is left to do.
    Finished,
    /// The round had already closed.
    Late,
}

/// Turns per-node "more work?" votes into at most one host requeue per round.
#[derive(Debug, Default)]
pub struct RequeueCoordinator {
    guard: RequeueGuard,
    issued: usize,
}

impl RequeueCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn guard(&self) -> &RequeueGuard {
        &self.guard
    }

    /// Total requeues submitted over the coordinator's lifetime.
    pub fn requeues_issued(&self) -> usize {
        self.issued
    }

    pub fn reset(&mut self) {
        self.guard.reset();
    }

    /// Report whether `voter` still has frames to emit.
    ///
    /// The round is keyed by the prompt id of the single running prompt, and
    /// its quorum is the number of voter nodes in that prompt. When the last
    /// expected vote arrives and any vote was `true`, the running prompt is
    /// resubmitted once.
    pub fn report<H>(&mut self, host: &mut H, voter: &str, has_more_work: bool) -> Result<Report>
    where
        H: HostBackend + ?Sized,
    {
        let (token, participants) = match host.currently_running() {
            [run] => (run.prompt_id.clone(), voters(&run.prompt)),
            others => {
                warn!(
                    running = others.len(),
                    voter,
                    "expected exactly one running prompt; skipping requeue vote"
                );
                return Ok(Report::Ignored {
                    running: others.len(),
                });
            }
        };

        match self
            .guard
            .cast_vote(&token, &participants, voter, has_more_work)
        {
            VoteOutcome::Pending { cast, required } => Ok(Report::Pending { cast, required }),
            VoteOutcome::Late => Ok(Report::Late),
            VoteOutcome::Finished => {
                info!(token = %token, "all inputs drained; not requeueing");
                Ok(Report::Finished)
            }
            VoteOutcome::Requeue => {
                let Some(running) = host.currently_running().first().cloned() else {
                    return Ok(Report::Ignored { running: 0 });
                };
                let submission = build_requeue(host, &running);
                let prompt_id = submission.prompt_id.clone();
                let number = submission.number;

                host.enqueue(submission)?;
                self.issued += 1;

                info!(
                    previous = %token,
                    prompt_id = %prompt_id,
                    number,
                    "requeued prompt for next batch"
                );
                Ok(Report::Requeued { prompt_id, number })
            }
        }
    }
}
