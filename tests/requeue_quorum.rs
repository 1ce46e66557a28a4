// tests/requeue_quorum.rs

use folderfeed::host::{HostBackend, QueuedPrompt, REQUEUE_INPUT};
use folderfeed::requeue::{
    Report, RequeueCoordinator, RequeueGuard, RoundState, VoteOutcome, bump_requeue_counters,
    voters,
};
use folderfeed_test_utils::builders::PromptBuilder;
use folderfeed_test_utils::fake_host::FakeHost;
use folderfeed_test_utils::init_tracing;
use serde_json::json;
use std::path::Path;

fn ids(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Three unmanaged incremental loaders plus an indexed loader and a manager.
fn three_voter_prompt() -> folderfeed::host::PromptGraph {
    let dir = Path::new("/unused");
    PromptBuilder::new()
        .incremental("1", dir, 1)
        .incremental("2", dir, 1)
        .incremental("3", dir, 1)
        .folder("4", dir, 0, 1)
        .manager("5", 1)
        .build()
}

#[test]
fn voters_are_the_incremental_loaders() {
    assert_eq!(voters(&three_voter_prompt()), ids(&["1", "2", "3"]));
}

#[test]
fn quorum_waits_for_every_voter() {
    init_tracing();
    let voters = ids(&["a", "b", "c"]);
    let mut guard = RequeueGuard::new();
    assert_eq!(guard.state(), RoundState::Idle);

    assert_eq!(
        guard.cast_vote("t1", &voters, "a", true),
        VoteOutcome::Pending { cast: 1, required: 3 }
    );
    assert_eq!(
        guard.cast_vote("t1", &voters, "b", true),
        VoteOutcome::Pending { cast: 2, required: 3 }
    );
    assert_eq!(guard.state(), RoundState::Open);

    assert_eq!(guard.cast_vote("t1", &voters, "c", false), VoteOutcome::Requeue);
    assert_eq!(guard.state(), RoundState::Closed);
    assert_eq!(guard.more_work("c"), Some(false));

    // The round is over; stragglers are dropped.
    assert_eq!(guard.cast_vote("t1", &voters, "a", true), VoteOutcome::Late);
    assert_eq!(guard.votes_cast(), 3);
}

#[test]
fn all_done_votes_finish_without_requeue() {
    init_tracing();
    let voters = ids(&["a", "b"]);
    let mut guard = RequeueGuard::new();

    guard.cast_vote("t1", &voters, "a", false);
    assert_eq!(guard.cast_vote("t1", &voters, "b", false), VoteOutcome::Finished);
}

#[test]
fn new_token_opens_a_fresh_round() {
    init_tracing();
    let voters = ids(&["a", "b"]);
    let mut guard = RequeueGuard::new();

    guard.cast_vote("t1", &voters, "a", true);
    assert_eq!(guard.run_token(), Some("t1"));

    // Round t1 never completed; t2 must not inherit its votes.
    assert_eq!(
        guard.cast_vote("t2", &voters, "a", false),
        VoteOutcome::Pending { cast: 1, required: 2 }
    );
    assert_eq!(guard.run_token(), Some("t2"));
    assert_eq!(guard.cast_vote("t2", &voters, "b", false), VoteOutcome::Finished);
}

#[test]
fn coordinator_requeues_exactly_once_per_round() {
    init_tracing();
    let mut host = FakeHost::running(three_voter_prompt());
    let mut coordinator = RequeueCoordinator::new();

    assert_eq!(
        coordinator.report(&mut host, "1", true).unwrap(),
        Report::Pending { cast: 1, required: 3 }
    );
    assert_eq!(
        coordinator.report(&mut host, "2", true).unwrap(),
        Report::Pending { cast: 2, required: 3 }
    );
    assert!(host.enqueued().is_empty());

    let third = coordinator.report(&mut host, "3", false).unwrap();
    assert!(matches!(third, Report::Requeued { .. }));
    assert_eq!(host.enqueued().len(), 1);

    assert_eq!(coordinator.report(&mut host, "1", true).unwrap(), Report::Late);
    assert_eq!(host.enqueued().len(), 1);
    assert_eq!(coordinator.requeues_issued(), 1);
}

#[test]
fn coordinator_does_not_requeue_when_all_inputs_are_drained() {
    init_tracing();
    let mut host = FakeHost::running(three_voter_prompt());
    let mut coordinator = RequeueCoordinator::new();

    for voter in ["1", "2", "3"] {
        coordinator.report(&mut host, voter, false).unwrap();
    }
    assert!(host.enqueued().is_empty());
    assert_eq!(coordinator.requeues_issued(), 0);
}

#[test]
fn ambiguous_running_table_is_ignored() {
    init_tracing();
    let prompt = three_voter_prompt();
    let mut host = FakeHost::new();
    let mut coordinator = RequeueCoordinator::new();

    assert_eq!(
        coordinator.report(&mut host, "1", true).unwrap(),
        Report::Ignored { running: 0 }
    );

    let run = |n: i64| QueuedPrompt {
        number: n,
        prompt_id: format!("p{n}"),
        prompt: prompt.clone(),
    };
    host.set_running(vec![run(0), run(1)]);
    for voter in ["1", "2", "3"] {
        assert_eq!(
            coordinator.report(&mut host, voter, true).unwrap(),
            Report::Ignored { running: 2 }
        );
    }
    assert!(host.enqueued().is_empty());
    assert_eq!(coordinator.guard().state(), RoundState::Idle);
}

#[test]
fn requeue_submission_bumps_counters_and_jumps_the_queue() {
    init_tracing();
    let mut host = FakeHost::running(three_voter_prompt());
    let original_id = host.running_prompts()[0].prompt_id.clone();
    let mut coordinator = RequeueCoordinator::new();

    for voter in ["1", "2", "3"] {
        coordinator.report(&mut host, voter, true).unwrap();
    }

    let queued = &host.enqueued()[0];
    assert_eq!(queued.number, -1);
    assert_ne!(queued.prompt_id, original_id);
    assert_eq!(queued.prompt_id.len(), 36);

    for id in ["1", "2", "3", "5"] {
        assert_eq!(queued.prompt.get(id).unwrap().requeue_count(), 1, "node {id}");
    }
    // Indexed loaders have no counter.
    assert!(queued.prompt.get("4").unwrap().inputs.get(REQUEUE_INPUT).is_none());
}

#[test]
fn requeue_numbers_are_negated_host_counter_values() {
    init_tracing();
    let mut host = FakeHost::running(three_voter_prompt());
    // FakeHost::running consumed counter value 0.
    assert_eq!(host.next_number(), 1);

    let mut coordinator = RequeueCoordinator::new();
    for voter in ["1", "2", "3"] {
        coordinator.report(&mut host, voter, true).unwrap();
    }
    assert_eq!(host.enqueued()[0].number, -2);
}

#[test]
fn bump_counts_touched_nodes() {
    let mut prompt = three_voter_prompt();
    prompt
        .get_mut("1")
        .unwrap()
        .inputs
        .insert(REQUEUE_INPUT.to_string(), json!(4));

    assert_eq!(bump_requeue_counters(&mut prompt), 4);
    assert_eq!(prompt.get("1").unwrap().requeue_count(), 5);
    assert_eq!(prompt.get("2").unwrap().requeue_count(), 1);
}
