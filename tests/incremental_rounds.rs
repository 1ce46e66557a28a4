// tests/incremental_rounds.rs

use folderfeed::engine::{EngineCore, RoundReport};
use folderfeed::errors::FeedError;
use folderfeed::host::{PromptGraph, QueuedPrompt};
use folderfeed::node::{IncrementalInputs, NodeContext, NodeOutput, load_next};
use folderfeed::requeue::Report;
use folderfeed_test_utils::builders::PromptBuilder;
use folderfeed_test_utils::fake_host::FakeHost;
use folderfeed_test_utils::fixtures::{folder_input, frame_folder, frame_levels};
use folderfeed_test_utils::init_tracing;
use tempfile::TempDir;

/// Execute the running prompt, then keep starting requeues until none is left.
fn run_to_completion(core: &mut EngineCore, host: &mut FakeHost) -> Vec<RoundReport> {
    let mut reports = Vec::new();
    loop {
        reports.push(execute_running(core, host).unwrap());
        assert!(reports.len() <= 20, "runaway requeue loop");
        if host.start_next().is_none() {
            break;
        }
    }
    reports
}

fn execute_running(
    core: &mut EngineCore,
    host: &mut FakeHost,
) -> folderfeed::errors::Result<RoundReport> {
    let run = host.running_prompts()[0].clone();
    core.execute(host, &run)
}

fn emitted(core: &EngineCore, id: &str) -> Vec<usize> {
    match core.output(id) {
        Some(NodeOutput::Incremental(out)) => frame_levels(&out.batch),
        other => panic!("node {id} has no incremental output: {other:?}"),
    }
}

#[test]
fn two_unmanaged_loaders_requeue_once_per_round() {
    init_tracing();
    let a = frame_folder(3);
    let b = frame_folder(3);
    let prompt = PromptBuilder::new()
        .incremental("a", a.path(), 1)
        .incremental("b", b.path(), 1)
        .build();

    let mut host = FakeHost::running(prompt);
    let mut core = EngineCore::new(NodeContext::new());

    let first = execute_running(&mut core, &mut host).unwrap();
    assert_eq!(host.enqueued().len(), 1);
    assert_eq!(first.requeued.as_deref(), Some(host.enqueued()[0].prompt_id.as_str()));
    assert_eq!(emitted(&core, "a"), vec![0]);

    host.start_next();
    let rest = run_to_completion(&mut core, &mut host);

    assert_eq!(rest.len(), 2);
    assert!(rest[0].requeued.is_some());
    assert!(rest[1].requeued.is_none());
    assert_eq!(emitted(&core, "a"), vec![2]);
    assert_eq!(emitted(&core, "b"), vec![2]);
    assert_eq!(core.context().coordinator.requeues_issued(), 2);
    assert!(core.context().registry.is_empty());
}

#[test]
fn loader_reports_frame_count_and_batch_size() {
    init_tracing();
    let dir = frame_folder(5);
    let prompt = PromptBuilder::new().incremental("x", dir.path(), 2).build();

    let mut host = FakeHost::running(prompt);
    let mut core = EngineCore::new(NodeContext::new());
    let reports = run_to_completion(&mut core, &mut host);

    assert_eq!(reports.len(), 3);
    let shapes: Vec<_> = reports.iter().map(|r| r.nodes[0].shape.unwrap().0).collect();
    assert_eq!(shapes, vec![2, 2, 1]);
    assert!(reports.iter().all(|r| r.nodes[0].frame_count == Some(5)));
    assert_eq!(reports[2].nodes[0].vote, Some(Report::Finished));
}

#[test]
fn managed_loaders_stop_with_the_shortest_feed() {
    init_tracing();
    let long = frame_folder(5);
    let short = frame_folder(3);
    let prompt = PromptBuilder::new()
        .manager("m", 2)
        .managed("long", long.path(), "m")
        .managed("short", short.path(), "m")
        .build();

    let mut host = FakeHost::running(prompt);
    let mut core = EngineCore::new(NodeContext::new());
    let reports = run_to_completion(&mut core, &mut host);

    assert_eq!(reports.len(), 2);
    assert!(reports[0].requeued.is_some());
    assert!(reports[1].requeued.is_none());
    assert_eq!(emitted(&core, "long"), vec![2, 3]);
    assert_eq!(emitted(&core, "short"), vec![2]);

    let manager = core.context().manager("m").unwrap();
    assert_eq!(manager.total_frames(), Some(3));
    assert_eq!(manager.num_batches(), Some(2));
    assert!(manager.has_closed_inputs());
}

#[test]
fn fresh_submission_restarts_managed_loaders() {
    init_tracing();
    let long = frame_folder(5);
    let short = frame_folder(3);
    let prompt = PromptBuilder::new()
        .manager("m", 2)
        .managed("long", long.path(), "m")
        .managed("short", short.path(), "m")
        .build();

    let mut host = FakeHost::running(prompt.clone());
    let mut core = EngineCore::new(NodeContext::new());
    run_to_completion(&mut core, &mut host);
    // The long feed still has a cursor parked at frame 4.
    assert!(core.context().registry.contains("long"));

    host.set_running(vec![QueuedPrompt {
        number: 10,
        prompt_id: "second-run".to_string(),
        prompt,
    }]);
    let report = execute_running(&mut core, &mut host).unwrap();

    assert!(report.requeued.is_some());
    assert_eq!(emitted(&core, "long"), vec![0, 1]);
    assert_eq!(emitted(&core, "short"), vec![0, 1]);
    assert!(!core.context().manager("m").unwrap().has_closed_inputs());
}

#[test]
fn fresh_unmanaged_run_discards_an_abandoned_cursor() {
    init_tracing();
    let dir = frame_folder(4);
    let prompt = PromptBuilder::new().incremental("x", dir.path(), 1).build();

    let mut host = FakeHost::running(prompt.clone());
    let mut core = EngineCore::new(NodeContext::new());
    execute_running(&mut core, &mut host).unwrap();
    assert_eq!(emitted(&core, "x"), vec![0]);

    // Abandon the requeue and submit the graph again from scratch.
    host.set_running(vec![QueuedPrompt {
        number: 20,
        prompt_id: "again".to_string(),
        prompt,
    }]);
    execute_running(&mut core, &mut host).unwrap();
    assert_eq!(emitted(&core, "x"), vec![0]);
}

#[test]
fn missing_folder_fails_without_leaving_a_cursor() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let prompt = PromptBuilder::new()
        .incremental("x", &dir.path().join("missing"), 1)
        .build();

    let mut host = FakeHost::running(prompt);
    let mut core = EngineCore::new(NodeContext::new());
    let running = host.running_prompts()[0].clone();
    let err = core
        .execute(&mut host, &running)
        .unwrap_err();

    assert!(matches!(err, FeedError::NotFound(_)));
    assert!(core.context().registry.is_empty());
    assert!(host.enqueued().is_empty());
}

#[test]
fn unknown_manager_is_reported() {
    init_tracing();
    let dir = frame_folder(2);
    let mut ctx = NodeContext::new();
    let mut host = FakeHost::running(PromptGraph::new());
    let inputs = IncrementalInputs {
        folder_path: folder_input(dir.path()),
        sort: true,
        batch_size: 1,
        meta_batch: Some(("nowhere".to_string(), 0)),
        requeue: 0,
    };

    let err = load_next(&mut ctx, &mut host, "x", &inputs).unwrap_err();
    assert!(matches!(err, FeedError::UnknownNode(_)));
    assert!(ctx.registry.is_empty());
}

#[test]
fn idle_cursors_are_evicted_before_a_round() {
    init_tracing();
    let dir = frame_folder(4);
    let prompt = PromptBuilder::new().incremental("x", dir.path(), 1).build();

    let ctx = NodeContext::new().with_cursor_ttl(std::time::Duration::ZERO);
    let mut core = EngineCore::new(ctx);
    let mut host = FakeHost::running(prompt);

    execute_running(&mut core, &mut host).unwrap();
    host.start_next();
    // The cursor from round one is gone, so the requeued round starts over.
    execute_running(&mut core, &mut host).unwrap();
    assert_eq!(emitted(&core, "x"), vec![0]);
}

#[test]
fn drained_loader_stays_drained_while_a_longer_feed_continues() {
    init_tracing();
    let short = frame_folder(2);
    let long = frame_folder(3);
    let prompt = PromptBuilder::new()
        .incremental("a", short.path(), 1)
        .incremental("b", long.path(), 1)
        .build();

    let mut host = FakeHost::running(prompt.clone());
    let mut core = EngineCore::new(NodeContext::new());

    let mut a_frames = Vec::new();
    let mut rounds = 0;
    loop {
        execute_running(&mut core, &mut host).unwrap();
        rounds += 1;
        match core.output("a") {
            Some(NodeOutput::Incremental(out)) if out.emitted > 0 => {
                a_frames.extend(frame_levels(&out.batch))
            }
            Some(NodeOutput::Incremental(out)) => {
                assert!(out.exhausted);
                assert_eq!(out.batch.images.dims(), &[1, 64, 64, 3]);
            }
            other => panic!("node a has no incremental output: {other:?}"),
        }
        assert!(rounds <= 10, "runaway requeue loop");
        if host.start_next().is_none() {
            break;
        }
    }

    assert_eq!(rounds, 3);
    assert_eq!(a_frames, vec![0, 1]);
    assert_eq!(emitted(&core, "b"), vec![2]);
    assert!(core.context().registry.is_empty());

    // A fresh submission starts the short feed over.
    host.set_running(vec![QueuedPrompt {
        number: 30,
        prompt_id: "fresh".to_string(),
        prompt,
    }]);
    execute_running(&mut core, &mut host).unwrap();
    assert_eq!(emitted(&core, "a"), vec![0]);
    assert!(!core.context().is_drained("a"));
}
