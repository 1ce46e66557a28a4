// src/node/manager_node.rs

use tracing::info;

use crate::batch::BatchManager;
use crate::node::context::NodeContext;
use crate::node::inputs::ManagerInputs;
use crate::types::NodeId;

/// `BatchManager`: create or refresh the manager owned by node `id`.
///
/// `requeue == 0` marks a fresh submission: the manager is reset, any
/// cursors it still tracks are dropped, and `frames_per_batch` is taken from
/// the inputs. Later rounds keep the manager as is and only log progress.
pub fn update_manager(ctx: &mut NodeContext, id: &str, inputs: &ManagerInputs) -> NodeId {
    let manager = ctx
        .managers
        .entry(id.to_string())
        .or_insert_with(|| BatchManager::new(id, inputs.frames_per_batch));

    if inputs.requeue == 0 {
        let dropped = manager.reset();
        manager.set_frames_per_batch(inputs.frames_per_batch);
        manager.set_unique_id(id);

        for run_id in &dropped {
            ctx.registry.remove(run_id);
        }

        info!(
            manager = id,
            frames_per_batch = manager.frames_per_batch(),
            dropped = dropped.len(),
            "batch manager starting fresh run"
        );
    } else {
        let total = manager
            .num_batches()
            .map(|n| n.to_string())
            .unwrap_or_else(|| "?".to_string());
        info!(manager = id, "meta-batch {}/{}", inputs.requeue, total);
    }

    manager.unique_id().to_string()
}
