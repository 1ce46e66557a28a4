// src/batch/registry.rs

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::errors::Result;
use crate::loader::{ImageSequence, LoadedImage, open};
use crate::types::NodeId;

/// Persisted iteration state for one incremental loader instance.
#[derive(Debug)]
pub struct ImageSequenceCursor {
    sequence: ImageSequence,
    total_frames: usize,
    frames_per_batch: usize,
    closed: bool,
    last_used: Instant,
}

/// Result of pulling a batch from a cursor.
#[derive(Debug)]
pub struct Advance {
    pub images: Vec<LoadedImage>,
    /// True once no files remain in the sequence.
    pub exhausted: bool,
}

impl ImageSequenceCursor {
    fn new(sequence: ImageSequence, total_frames: usize, frames_per_batch: usize) -> Self {
        Self {
            sequence,
            total_frames,
            frames_per_batch: frames_per_batch.max(1),
            closed: false,
            last_used: Instant::now(),
        }
    }

    pub fn total_frames(&self) -> usize {
        self.total_frames
    }

    /// Batch size recorded when the cursor was created.
    pub fn frames_per_batch(&self) -> usize {
        self.frames_per_batch
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn remaining(&self) -> usize {
        self.sequence.remaining()
    }

    pub fn folder(&self) -> &Path {
        self.sequence.folder()
    }

    fn touch(&mut self) {
        self.last_used = Instant::now();
    }

    /// Pull up to `n` decoded images.
    ///
    /// Returns fewer than `n` when the sequence ends first. The cursor closes
    /// as soon as no files remain, including when the tail of the listing
    /// was skipped as undecodable.
    pub fn advance(&mut self, n: usize) -> Advance {
        self.touch();
        let images: Vec<LoadedImage> = self.sequence.by_ref().take(n).collect();

        if self.sequence.is_exhausted() {
            self.closed = true;
        }

        debug!(
            folder = %self.sequence.folder().display(),
            pulled = images.len(),
            remaining = self.sequence.remaining(),
            closed = self.closed,
            "advanced cursor"
        );

        Advance {
            images,
            exhausted: self.closed,
        }
    }
}

/// Cursors keyed by the run identity of the node that owns them.
#[derive(Debug, Default)]
pub struct CursorRegistry {
    cursors: HashMap<NodeId, ImageSequenceCursor>,
}

impl CursorRegistry {
    pub fn new() -> Self {
        Self {
            cursors: HashMap::new(),
        }
    }

    /// Return the cursor for `run_id`, opening `folder` on first access.
    ///
    /// Once a cursor exists, `folder`, `sort` and `frames_per_batch` are
    /// ignored: the stored cursor is authoritative for the rest of the run.
    pub fn get_or_create(
        &mut self,
        run_id: &str,
        folder: &Path,
        sort: bool,
        frames_per_batch: usize,
    ) -> Result<&mut ImageSequenceCursor> {
        match self.cursors.entry(run_id.to_string()) {
            Entry::Occupied(entry) => {
                let cursor = entry.into_mut();
                cursor.touch();
                Ok(cursor)
            }
            Entry::Vacant(entry) => {
                let (total, sequence) = open(folder, sort)?;
                info!(run_id, total, frames_per_batch, "created cursor");
                Ok(entry.insert(ImageSequenceCursor::new(sequence, total, frames_per_batch)))
            }
        }
    }

    pub fn get(&self, run_id: &str) -> Option<&ImageSequenceCursor> {
        self.cursors.get(run_id)
    }

    pub fn get_mut(&mut self, run_id: &str) -> Option<&mut ImageSequenceCursor> {
        self.cursors.get_mut(run_id)
    }

    pub fn contains(&self, run_id: &str) -> bool {
        self.cursors.contains_key(run_id)
    }

    /// Drop the cursor for `run_id`. Removing an absent key is a no-op.
    ///
    /// Returns whether a cursor was actually removed.
    pub fn remove(&mut self, run_id: &str) -> bool {
        let removed = self.cursors.remove(run_id).is_some();
        if removed {
            debug!(run_id, "removed cursor");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.cursors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cursors.is_empty()
    }

    /// Drop cursors that have not been touched for at least `ttl`.
    ///
    /// Returns the evicted run identities.
    pub fn evict_idle(&mut self, ttl: Duration) -> Vec<NodeId> {
        let stale: Vec<NodeId> = self
            .cursors
            .iter()
            .filter(|(_, cursor)| cursor.last_used.elapsed() >= ttl)
            .map(|(id, _)| id.clone())
            .collect();

        for id in &stale {
            self.cursors.remove(id);
            info!(run_id = %id, "evicted idle cursor");
        }
        stale
    }

    pub fn clear(&mut self) {
        self.cursors.clear();
    }
}
