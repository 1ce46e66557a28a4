#![allow(dead_code)]

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use tempfile::TempDir;

/// Write a solid-colour RGB PNG of `width` x `height` into `dir`.
pub fn write_rgb_png(dir: &Path, name: &str, width: u32, height: u32, colour: [u8; 3]) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(width, height, Rgb(colour))
        .save(&path)
        .expect("failed to write RGB fixture");
    path
}

/// Write a solid-colour RGBA PNG of `width` x `height` into `dir`.
pub fn write_rgba_png(dir: &Path, name: &str, width: u32, height: u32, colour: [u8; 4]) -> PathBuf {
    let path = dir.join(name);
    RgbaImage::from_pixel(width, height, Rgba(colour))
        .save(&path)
        .expect("failed to write RGBA fixture");
    path
}

/// Write `image` as a JPEG carrying an EXIF Orientation tag.
///
/// The encoded stream gets an APP1 segment right after SOI holding a
/// minimal little-endian TIFF with a single IFD0 entry (tag 0x0112).
pub fn write_jpeg_with_orientation(
    dir: &Path,
    name: &str,
    image: &RgbImage,
    orientation: u16,
) -> PathBuf {
    let mut encoded = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Jpeg)
        .expect("failed to encode JPEG fixture");

    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"II\x2a\x00");
    tiff.extend_from_slice(&8u32.to_le_bytes());
    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&0x0112u16.to_le_bytes());
    tiff.extend_from_slice(&3u16.to_le_bytes());
    tiff.extend_from_slice(&1u32.to_le_bytes());
    tiff.extend_from_slice(&orientation.to_le_bytes());
    tiff.extend_from_slice(&[0, 0]);
    tiff.extend_from_slice(&0u32.to_le_bytes());

    let payload_len = (2 + 6 + tiff.len()) as u16;
    let mut bytes = Vec::with_capacity(encoded.len() + payload_len as usize + 2);
    bytes.extend_from_slice(&encoded[..2]);
    bytes.extend_from_slice(&[0xFF, 0xE1]);
    bytes.extend_from_slice(&payload_len.to_be_bytes());
    bytes.extend_from_slice(b"Exif\0\0");
    bytes.extend_from_slice(&tiff);
    bytes.extend_from_slice(&encoded[2..]);

    write_bytes(dir, name, &bytes)
}

/// Write arbitrary bytes (e.g. a file that is not a real image).
pub fn write_bytes(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).expect("failed to write fixture file");
    path
}

/// Temp folder with `count` 8x8 frames named `frame_000.png`, `frame_001.png`, ...
///
/// Frame `i` is filled with grey level `i` so tests can tell frames apart.
pub fn frame_folder(count: usize) -> TempDir {
    let dir = TempDir::new().expect("failed to create temp dir");
    for i in 0..count {
        let level = (i % 256) as u8;
        write_rgb_png(dir.path(), &format!("frame_{i:03}.png"), 8, 8, [level; 3]);
    }
    dir
}

/// Folder path as the string a node input expects.
pub fn folder_input(dir: &Path) -> String {
    dir.to_string_lossy().into_owned()
}

/// Grey level of each frame in `batch`, read from its first pixel.
///
/// Pairs with [`frame_folder`], where frame `i` has level `i`.
pub fn frame_levels(batch: &folderfeed::batch::ImageBatch) -> Vec<usize> {
    (0..batch.len())
        .map(|i| {
            let frame = batch.images.get(i).expect("frame index in range");
            let first = frame
                .flatten_all()
                .and_then(|t| t.to_vec1::<f32>())
                .expect("frame readable as f32")[0];
            (first * 255.0).round() as usize
        })
        .collect()
}
