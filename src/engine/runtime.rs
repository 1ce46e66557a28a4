// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::host::LocalHost;

use super::core::EngineCore;
use super::{RoundReport, RunSummary, RuntimeEvent, RuntimeOptions};

/// Drives the local host queue in response to `RuntimeEvent`s and executes
/// each started prompt with the [`EngineCore`].
///
/// This is the async shell: it reads events from a channel and forwards
/// round reports; all node semantics live in the core.
pub struct Runtime {
    core: EngineCore,
    host: LocalHost,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    report_tx: Option<mpsc::Sender<RoundReport>>,
    options: RuntimeOptions,
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("host", &self.host)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Runtime {
    pub fn new(
        core: EngineCore,
        host: LocalHost,
        event_rx: mpsc::Receiver<RuntimeEvent>,
        options: RuntimeOptions,
    ) -> Self {
        Self {
            core,
            host,
            event_rx,
            report_tx: None,
            options,
        }
    }

    /// Send a [`RoundReport`] after every executed prompt.
    pub fn with_reports(mut self, report_tx: mpsc::Sender<RoundReport>) -> Self {
        self.report_tx = Some(report_tx);
        self
    }

    /// Main loop.
    ///
    /// - Drains pending `RuntimeEvent`s.
    /// - Starts the next queued prompt and executes it.
    /// - When the queue is empty, exits or waits for the next event,
    ///   depending on `exit_when_idle`.
    pub async fn run(mut self) -> Result<RunSummary> {
        info!("folderfeed runtime started");
        let mut summary = RunSummary::default();

        'outer: loop {
            while let Ok(event) = self.event_rx.try_recv() {
                if !self.handle_event(event)? {
                    break 'outer;
                }
            }

            if let Some(max) = self.options.max_rounds {
                if summary.rounds >= max {
                    warn!(
                        max_rounds = max,
                        pending = self.host.pending(),
                        "round limit reached; stopping"
                    );
                    break;
                }
            }

            let Some(run) = self.host.start_next() else {
                if self.options.exit_when_idle {
                    info!("host queue drained; exiting");
                    break;
                }
                match self.event_rx.recv().await {
                    Some(event) => {
                        if !self.handle_event(event)? {
                            break;
                        }
                        continue;
                    }
                    None => {
                        info!("runtime event channel closed; exiting");
                        break;
                    }
                }
            };

            let result = self.core.execute(&mut self.host, &run);
            self.host.finish(&run.prompt_id);
            let report = result?;

            summary.rounds += 1;
            if report.requeued.is_some() {
                summary.requeues += 1;
            }

            let delivered = match &self.report_tx {
                Some(tx) => tx.send(report).await.is_ok(),
                None => true,
            };
            if !delivered {
                debug!("round report receiver dropped");
                self.report_tx = None;
            }

            tokio::task::yield_now().await;
        }

        info!(rounds = summary.rounds, requeues = summary.requeues, "runtime exiting");
        Ok(summary)
    }

    /// Apply one event; returns `false` when the runtime should stop.
    fn handle_event(&mut self, event: RuntimeEvent) -> Result<bool> {
        match event {
            RuntimeEvent::PromptSubmitted(prompt) => {
                let prompt_id = self.host.submit(prompt)?;
                debug!(prompt_id = %prompt_id, "prompt submitted");
                Ok(true)
            }
            RuntimeEvent::ShutdownRequested => {
                info!("shutdown requested; stopping runtime");
                Ok(false)
            }
        }
    }
}
