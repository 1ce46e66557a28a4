// src/loader/sequence.rs

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::errors::{FeedError, Result};
use crate::loader::decode::{LoadedImage, decode_image};
use crate::loader::listing::list_images;

/// Lazy sequence of decoded images from one folder.
///
/// The listing is taken once up front; each `next()` decodes the next file
/// that still decodes. The position is the queue of files not yet pulled,
/// so the sequence can be stored and resumed from a later invocation.
#[derive(Debug)]
pub struct ImageSequence {
    folder: PathBuf,
    pending: VecDeque<PathBuf>,
    total: usize,
    skipped: usize,
}

/// Open `folder` and return its image count alongside a lazy sequence.
///
/// Fails with `NotFound` if the folder is missing or holds no image files.
pub fn open(folder: impl AsRef<Path>, sort: bool) -> Result<(usize, ImageSequence)> {
    let folder = folder.as_ref();
    let files = list_images(folder, sort)?;

    if files.is_empty() {
        return Err(FeedError::NotFound(format!(
            "no images found in folder: {}",
            folder.display()
        )));
    }

    let total = files.len();
    info!(folder = %folder.display(), total, sort, "opened image sequence");

    let sequence = ImageSequence {
        folder: folder.to_path_buf(),
        pending: files.into(),
        total,
        skipped: 0,
    };
    Ok((total, sequence))
}

impl ImageSequence {
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Number of files in the listing, decodable or not.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Files not yet pulled.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    /// Files that failed to decode so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn is_exhausted(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Iterator for ImageSequence {
    type Item = LoadedImage;

    fn next(&mut self) -> Option<LoadedImage> {
        while let Some(path) = self.pending.pop_front() {
            match decode_image(&path) {
                Ok(image) => return Some(image),
                Err(err) => {
                    self.skipped += 1;
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "skipping image that failed to load"
                    );
                }
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.pending.len()))
    }
}
