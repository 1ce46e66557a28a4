// src/loader/mod.rs

//! Folder image loading.
//!
//! - [`listing`] enumerates the image files directly inside a folder.
//! - [`decode`] turns one file into normalized `(H, W, 3)` pixels plus an
//!   optional alpha plane.
//! - [`sequence`] wraps a listing into a lazy, resumable sequence that
//!   decodes one file at a time.

pub mod decode;
pub mod listing;
pub mod sequence;

pub use decode::{LoadedImage, decode_image};
pub use listing::{IMAGE_EXTENSIONS, list_images};
pub use sequence::{ImageSequence, open};
