// src/lib.rs

pub mod batch;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod host;
pub mod loader;
pub mod logging;
pub mod node;
pub mod requeue;
pub mod types;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::engine::{EngineCore, RoundReport, Runtime, RuntimeEvent, RuntimeOptions};
use crate::host::LocalHost;
use crate::node::NodeContext;
use crate::requeue::voters;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - node context / engine core / local host
/// - the async runtime and its round reports
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_and_validate(&args.config)?;

    if args.dry_run {
        print_dry_run(&cfg)?;
        return Ok(());
    }

    let mut ctx = NodeContext::new();
    if let Some(ttl) = cfg.config.cursor_ttl() {
        ctx = ctx.with_cursor_ttl(ttl);
    }
    let core = EngineCore::new(ctx);

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(16);
    let (report_tx, mut report_rx) = mpsc::channel::<RoundReport>(16);

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    rt_tx
        .send(RuntimeEvent::PromptSubmitted(cfg.prompt().clone()))
        .await?;

    let options = RuntimeOptions {
        exit_when_idle: true,
        max_rounds: args.max_rounds.or(cfg.config.max_rounds),
    };
    info!(
        nodes = cfg.prompt().len(),
        max_rounds = ?options.max_rounds,
        "submitted prompt from config"
    );

    let printer = tokio::spawn(async move {
        while let Some(report) = report_rx.recv().await {
            print_round(&report);
        }
    });

    let runtime = Runtime::new(core, LocalHost::new(), rt_rx, options).with_reports(report_tx);
    let summary = runtime.run().await?;
    printer.await?;

    println!(
        "done: {} round(s), {} requeue(s)",
        summary.rounds, summary.requeues
    );
    Ok(())
}

/// One line per node with the shape it produced.
fn print_round(report: &RoundReport) {
    println!(
        "round {} (prompt {}, #{})",
        report.round, report.prompt_id, report.number
    );
    for node in &report.nodes {
        let shape = match node.shape {
            Some((b, h, w)) => format!("{b}x{h}x{w}"),
            None => "-".to_string(),
        };
        let cached = if node.cached { " (cached)" } else { "" };
        match node.frame_count {
            Some(frames) => println!(
                "  {} [{}] {} of {} frames{}",
                node.node, node.class, shape, frames, cached
            ),
            None => println!("  {} [{}] {}{}", node.node, node.class, shape, cached),
        }
    }
    if let Some(ref next) = report.requeued {
        println!("  requeued as {next}");
    }
}

/// Simple dry-run output: print settings, nodes and the execution order.
fn print_dry_run(cfg: &ConfigFile) -> Result<()> {
    println!("folderfeed dry-run");
    match cfg.config.cursor_ttl_secs {
        Some(secs) => println!("  config.cursor_ttl_secs = {secs}"),
        None => println!("  config.cursor_ttl_secs = (none)"),
    }
    match cfg.config.max_rounds {
        Some(n) => println!("  config.max_rounds = {n}"),
        None => println!("  config.max_rounds = (unlimited)"),
    }
    println!();

    println!("nodes ({}):", cfg.node.len());
    for (id, node) in cfg.node.iter() {
        println!("  - {id} [{}]", node.class);
        for (key, value) in node.inputs.iter() {
            println!("      {key}: {value}");
        }
    }

    let order = cfg.prompt().execution_order()?;
    println!();
    println!("execution order: {}", order.join(" -> "));
    println!("requeue voters: {:?}", voters(cfg.prompt()));

    debug!("dry-run complete (no images loaded)");
    Ok(())
}
