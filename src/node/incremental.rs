// src/node/incremental.rs

use std::path::Path;

use tracing::{debug, info};

use crate::batch::{ImageBatch, stack_loaded};
use crate::errors::{FeedError, Result};
use crate::host::HostBackend;
use crate::node::context::NodeContext;
use crate::node::inputs::IncrementalInputs;
use crate::requeue::Report;

/// Output of one `LoadImagesFromFolderIncremental` invocation.
#[derive(Debug, Clone)]
pub struct IncrementalOutput {
    pub batch: ImageBatch,
    /// Number of images actually decoded this round.
    pub emitted: usize,
    /// Total files in the folder listing.
    pub frame_count: usize,
    /// Whether this node's cursor ran out this round.
    pub exhausted: bool,
    pub report: Report,
}

/// `LoadImagesFromFolderIncremental`: emit the next batch for `run_id` and
/// vote on whether the prompt needs another round.
///
/// On failure the cursor for `run_id` is dropped before the error is
/// returned, so the next fresh run starts from a clean slate.
pub fn load_next<H>(
    ctx: &mut NodeContext,
    host: &mut H,
    run_id: &str,
    inputs: &IncrementalInputs,
) -> Result<IncrementalOutput>
where
    H: HostBackend + ?Sized,
{
    match advance_and_vote(ctx, host, run_id, inputs) {
        Ok(output) => Ok(output),
        Err(err) => {
            ctx.registry.remove(run_id);
            Err(err)
        }
    }
}

fn advance_and_vote<H>(
    ctx: &mut NodeContext,
    host: &mut H,
    run_id: &str,
    inputs: &IncrementalInputs,
) -> Result<IncrementalOutput>
where
    H: HostBackend + ?Sized,
{
    let manager_id = inputs.manager_id();

    // A fresh submission never continues a cursor from an abandoned run.
    if inputs.requeue == 0 {
        ctx.clear_drained(run_id);
        if ctx.registry.remove(run_id) {
            info!(run_id, "discarded cursor left over from an earlier run");
        }
    } else if ctx.is_drained(run_id) {
        return drained_round(ctx, host, run_id, manager_id);
    }

    let managed_frames = match manager_id {
        Some(id) => Some(
            ctx.managers
                .get(id)
                .ok_or_else(|| {
                    FeedError::UnknownNode(format!(
                        "node '{}' references batch manager '{}' which has not run",
                        run_id, id
                    ))
                })?
                .frames_per_batch(),
        ),
        None => None,
    };

    let cursor = ctx.registry.get_or_create(
        run_id,
        Path::new(&inputs.folder_path),
        inputs.sort,
        managed_frames.unwrap_or(inputs.batch_size),
    )?;
    let frame_count = cursor.total_frames();
    let take = managed_frames.unwrap_or_else(|| cursor.frames_per_batch());
    let advance = cursor.advance(take);

    let (voter, has_more_work) = match manager_id {
        Some(id) => {
            let manager = ctx.managers.get_mut(id).ok_or_else(|| {
                FeedError::UnknownNode(format!("batch manager '{}' disappeared", id))
            })?;
            manager.register(run_id, frame_count);
            if advance.exhausted {
                manager.close_input(run_id);
            }
            (
                manager.unique_id().to_string(),
                !manager.has_closed_inputs(),
            )
        }
        None => (run_id.to_string(), !advance.exhausted),
    };

    if advance.exhausted {
        ctx.registry.remove(run_id);
        ctx.mark_drained(run_id);
    }

    let emitted = advance.images.len();
    let batch = stack_loaded(&advance.images)?;

    debug!(
        run_id,
        emitted,
        frame_count,
        exhausted = advance.exhausted,
        voter = %voter,
        has_more_work,
        "incremental loader produced batch"
    );

    let report = ctx.coordinator.report(host, &voter, has_more_work)?;

    Ok(IncrementalOutput {
        batch,
        emitted,
        frame_count,
        exhausted: advance.exhausted,
        report,
    })
}

/// Round for a loader that already emitted its last frame this run: other
/// voters still have work, so emit the placeholder and vote `false`.
fn drained_round<H>(
    ctx: &mut NodeContext,
    host: &mut H,
    run_id: &str,
    manager_id: Option<&str>,
) -> Result<IncrementalOutput>
where
    H: HostBackend + ?Sized,
{
    let voter = match manager_id {
        Some(id) => ctx
            .managers
            .get(id)
            .map(|manager| manager.unique_id().to_string())
            .unwrap_or_else(|| id.to_string()),
        None => run_id.to_string(),
    };
    debug!(run_id, voter = %voter, "loader already drained; emitting placeholder");

    let report = ctx.coordinator.report(host, &voter, false)?;
    Ok(IncrementalOutput {
        batch: ImageBatch::placeholder()?,
        emitted: 0,
        frame_count: 0,
        exhausted: true,
        report,
    })
}
