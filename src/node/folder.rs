// src/node/folder.rs

use tracing::{debug, warn};

use crate::batch::{ImageBatch, stack_loaded};
use crate::errors::Result;
use crate::loader::{LoadedImage, decode_image, list_images};
use crate::node::inputs::FolderInputs;

/// `LoadImagesFromFolder`: load window `batch_index` of size `batch_size`.
///
/// A window that starts past the last file is not an error: it logs a
/// warning and returns the placeholder frame, so a workflow that steps the
/// index one too far keeps running.
pub fn load_window(inputs: &FolderInputs) -> Result<ImageBatch> {
    let files = list_images(&inputs.folder_path, inputs.sort)?;

    let start = inputs.batch_index.saturating_mul(inputs.batch_size);
    if start >= files.len() {
        warn!(
            batch_index = inputs.batch_index,
            batch_size = inputs.batch_size,
            available = files.len(),
            "batch index out of range; emitting placeholder frame"
        );
        return ImageBatch::placeholder();
    }

    let end = start.saturating_add(inputs.batch_size).min(files.len());
    debug!(start, end, available = files.len(), "loading batch window");

    let images: Vec<LoadedImage> = files[start..end]
        .iter()
        .filter_map(|path| match decode_image(path) {
            Ok(image) => Some(image),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping image that failed to load");
                None
            }
        })
        .collect();

    stack_loaded(&images)
}
