// src/loader/decode.rs

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use candle_core::{DType, Device, Tensor};
use image::DynamicImage;
use tracing::trace;

use crate::errors::{FeedError, Result};

/// One decoded image, normalized to `f32` in `[0, 1]`.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub path: PathBuf,
    /// `(height, width, 3)` RGB pixels.
    pub pixels: Tensor,
    /// `(height, width)` alpha plane, if the source had one.
    pub alpha: Option<Tensor>,
}

impl LoadedImage {
    pub fn height(&self) -> usize {
        self.pixels.dims()[0]
    }

    pub fn width(&self) -> usize {
        self.pixels.dims()[1]
    }

    /// Mask derived from alpha: `1 - alpha`, so opaque pixels are 0.
    ///
    /// Without an alpha channel the mask is all zeros.
    pub fn mask(&self) -> Result<Tensor> {
        let mask = match &self.alpha {
            Some(alpha) => alpha.affine(-1.0, 1.0)?,
            None => Tensor::zeros((self.height(), self.width()), DType::F32, &Device::Cpu)?,
        };
        Ok(mask)
    }
}

/// Read, decode and orient a single image file.
pub fn decode_image(path: impl AsRef<Path>) -> Result<LoadedImage> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| decode_error(path, e))?;
    let decoded = image::load_from_memory(&bytes).map_err(|e| decode_error(path, e))?;

    let orientation = read_orientation(&bytes);
    trace!(path = %path.display(), ?orientation, "decoded image");

    let image = apply_orientation(decoded, orientation);
    to_tensors(path, &image)
}

fn decode_error(path: &Path, err: impl ToString) -> FeedError {
    FeedError::Decode {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

/// EXIF orientation tag (1..=8) if the container carries one.
fn read_orientation(bytes: &[u8]) -> Option<u32> {
    let exif = exif::Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .ok()?;
    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    field.value.get_uint(0)
}

/// Rotate/flip so that the pixel rows match the intended display.
///
/// `rotate90` and friends are clockwise.
fn apply_orientation(image: DynamicImage, orientation: Option<u32>) -> DynamicImage {
    match orientation {
        Some(2) => image.fliph(),
        Some(3) => image.rotate180(),
        Some(4) => image.flipv(),
        Some(5) => image.rotate90().fliph(),
        Some(6) => image.rotate90(),
        Some(7) => image.rotate270().fliph(),
        Some(8) => image.rotate270(),
        _ => image,
    }
}

fn to_tensors(path: &Path, image: &DynamicImage) -> Result<LoadedImage> {
    let (width, height) = (image.width() as usize, image.height() as usize);

    let rgb = image.to_rgb32f().into_raw();
    let pixels = Tensor::from_vec(rgb, (height, width, 3), &Device::Cpu)?;

    let alpha = if image.color().has_alpha() {
        let plane: Vec<f32> = image.to_rgba32f().pixels().map(|p| p.0[3]).collect();
        Some(Tensor::from_vec(plane, (height, width), &Device::Cpu)?)
    } else {
        None
    };

    Ok(LoadedImage {
        path: path.to_path_buf(),
        pixels,
        alpha,
    })
}
