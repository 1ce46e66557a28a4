// src/batch/mod.rs

//! Batch state kept between invocations, and batch assembly.
//!
//! - [`registry`] owns one cursor per incremental loader instance.
//! - [`manager`] holds the frames-per-batch policy shared by a group of
//!   loaders.
//! - [`stacker`] pads and stacks decoded images into one tensor.

pub mod manager;
pub mod registry;
pub mod stacker;

pub use manager::BatchManager;
pub use registry::{Advance, CursorRegistry, ImageSequenceCursor};
pub use stacker::{ImageBatch, PLACEHOLDER_SIZE, stack_images, stack_loaded, stack_with_masks};
