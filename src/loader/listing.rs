// src/loader/listing.rs

use std::fs;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};
use tracing::debug;

use crate::errors::{FeedError, Result};

/// Extensions accepted by the loader, matched case-insensitively.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "webp", "tiff"];

fn image_matcher() -> Result<GlobMatcher> {
    let pattern = format!("*.{{{}}}", IMAGE_EXTENSIONS.join(","));
    let glob = GlobBuilder::new(&pattern)
        .case_insensitive(true)
        .literal_separator(true)
        .build()
        .map_err(anyhow::Error::from)?;
    Ok(glob.compile_matcher())
}

/// List the image files directly inside `folder` (non-recursive).
///
/// With `sort = true` the result is ordered by file name (byte order), which
/// is stable across calls. Without it, the order is whatever the directory
/// enumeration produced.
///
/// Returns `NotFound` if `folder` is not a directory. An existing folder with
/// no matching files yields an empty list; callers decide whether that is
/// fatal.
pub fn list_images(folder: impl AsRef<Path>, sort: bool) -> Result<Vec<PathBuf>> {
    let folder = folder.as_ref();
    if !folder.is_dir() {
        return Err(FeedError::NotFound(format!(
            "folder not found: {}",
            folder.display()
        )));
    }

    let matcher = image_matcher()?;
    let mut files = Vec::new();

    for entry in fs::read_dir(folder)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        // A bare ".png" has no stem, so it is not an image file.
        if path.extension().is_none() {
            continue;
        }
        let Some(name) = path.file_name() else {
            continue;
        };
        if matcher.is_match(name) {
            files.push(path);
        }
    }

    if sort {
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    }

    debug!(
        folder = %folder.display(),
        count = files.len(),
        sort,
        "listed image files"
    );

    Ok(files)
}
