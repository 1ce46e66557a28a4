// src/requeue/guard.rs

//! Round-scoped vote counting.
//!
//! This is the pure half of the requeue protocol: it only sees a round
//! token, the list of expected voters and the votes themselves. Reading the
//! host's running table and submitting the requeue live in
//! [`super::coordinator`].

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::host::PromptGraph;
use crate::types::NodeId;

/// Where the guard is within the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundState {
    /// No round observed yet.
    Idle,
    /// Collecting votes.
    Open,
    /// Quorum reached; further votes for this token are dropped.
    Closed,
}

/// Result of casting one vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    /// Vote recorded; quorum not reached yet.
    Pending { cast: usize, required: usize },
    /// Quorum reached and at least one voter has more work.
    Requeue,
    /// Quorum reached and every voter is done.
    Finished,
    /// The round already closed; the vote was ignored.
    Late,
}

/// Vote state for the round identified by `run_token`.
///
/// Invariants: `votes_cast <= votes_required` and at most one `Requeue`
/// outcome per token.
#[derive(Debug, Default)]
pub struct RequeueGuard {
    run_token: Option<String>,
    votes_cast: usize,
    votes_required: usize,
    per_node_more_work: BTreeMap<NodeId, bool>,
    closed: bool,
}

/// Nodes expected to vote in a round of `prompt`: every incremental loader.
pub fn voters(prompt: &PromptGraph) -> Vec<NodeId> {
    prompt
        .iter()
        .filter(|(_, node)| node.class_type.votes_on_requeue())
        .map(|(id, _)| id.to_string())
        .collect()
}

impl RequeueGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RoundState {
        match (&self.run_token, self.closed) {
            (None, _) => RoundState::Idle,
            (Some(_), false) => RoundState::Open,
            (Some(_), true) => RoundState::Closed,
        }
    }

    pub fn run_token(&self) -> Option<&str> {
        self.run_token.as_deref()
    }

    pub fn votes_cast(&self) -> usize {
        self.votes_cast
    }

    pub fn votes_required(&self) -> usize {
        self.votes_required
    }

    /// The last vote recorded for `voter` in the current round.
    pub fn more_work(&self, voter: &str) -> Option<bool> {
        self.per_node_more_work.get(voter).copied()
    }

    /// Record a vote for the round `token`.
    ///
    /// A token different from the stored one opens a new round whose quorum
    /// is `voters.len()`; `voters` is ignored for an already-open round.
    pub fn cast_vote(
        &mut self,
        token: &str,
        voters: &[NodeId],
        voter: &str,
        has_more_work: bool,
    ) -> VoteOutcome {
        if self.run_token.as_deref() != Some(token) {
            self.open_round(token, voters);
        }

        if self.closed {
            debug!(token, voter, "vote after round closed; ignoring");
            return VoteOutcome::Late;
        }

        self.per_node_more_work
            .insert(voter.to_string(), has_more_work);
        self.votes_cast += 1;

        debug!(
            token,
            voter,
            has_more_work,
            cast = self.votes_cast,
            required = self.votes_required,
            "requeue vote recorded"
        );

        if self.votes_cast < self.votes_required {
            return VoteOutcome::Pending {
                cast: self.votes_cast,
                required: self.votes_required,
            };
        }

        self.closed = true;
        if self.per_node_more_work.values().any(|&more| more) {
            VoteOutcome::Requeue
        } else {
            VoteOutcome::Finished
        }
    }

    /// Forget the current round entirely.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn open_round(&mut self, token: &str, voters: &[NodeId]) {
        let required = if voters.is_empty() {
            // A vote arrived from a graph with no known voters; let that
            // single vote decide rather than never closing.
            warn!(token, "no requeue voters found in running prompt");
            1
        } else {
            voters.len()
        };

        debug!(token, required, "opening requeue round");

        self.run_token = Some(token.to_string());
        self.votes_cast = 0;
        self.votes_required = required;
        self.per_node_more_work.clear();
        self.closed = false;
    }
}
