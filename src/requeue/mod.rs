// src/requeue/mod.rs

//! Requeue protocol.
//!
//! A host runs each node once per prompt and has no notion of a node that
//! wants to keep going. Incremental loaders therefore vote after every
//! invocation; once every voter in the running prompt has reported, the
//! prompt is resubmitted exactly once if any of them has frames left.
//!
//! - [`guard`] holds the per-round vote state (pure, no host access).
//! - [`submission`] builds the resubmitted prompt.
//! - [`coordinator`] connects the two to a [`crate::host::HostBackend`].

pub mod coordinator;
pub mod guard;
pub mod submission;

pub use coordinator::{Report, RequeueCoordinator};
pub use guard::{RequeueGuard, RoundState, VoteOutcome, voters};
pub use submission::{build_requeue, bump_requeue_counters};
