// src/batch/stacker.rs

//! Pad-and-stack of variable-sized images into one batch tensor.

use anyhow::anyhow;
use candle_core::{DType, Device, Tensor};

use crate::errors::Result;
use crate::loader::LoadedImage;

/// Side length of the black frame emitted when there is nothing to stack.
pub const PLACEHOLDER_SIZE: usize = 64;

/// A stacked batch: `(B, H, W, 3)` images and `(B, H, W)` masks.
#[derive(Debug, Clone)]
pub struct ImageBatch {
    pub images: Tensor,
    pub masks: Tensor,
}

impl ImageBatch {
    /// Single 64x64 black frame with an all-zero mask.
    pub fn placeholder() -> Result<Self> {
        let images = Tensor::zeros(
            (1, PLACEHOLDER_SIZE, PLACEHOLDER_SIZE, 3),
            DType::F32,
            &Device::Cpu,
        )?;
        let masks = Tensor::zeros(
            (1, PLACEHOLDER_SIZE, PLACEHOLDER_SIZE),
            DType::F32,
            &Device::Cpu,
        )?;
        Ok(Self { images, masks })
    }

    pub fn len(&self) -> usize {
        self.images.dims()[0]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn height(&self) -> usize {
        self.images.dims()[1]
    }

    pub fn width(&self) -> usize {
        self.images.dims()[2]
    }
}

/// Stack decoded images together with their alpha-derived masks.
pub fn stack_loaded(images: &[LoadedImage]) -> Result<ImageBatch> {
    let pixels: Vec<Tensor> = images.iter().map(|img| img.pixels.clone()).collect();
    let masks = images
        .iter()
        .map(LoadedImage::mask)
        .collect::<Result<Vec<_>>>()?;

    let (images, masks) = stack_with_masks(&pixels, &masks)?;
    Ok(ImageBatch { images, masks })
}

/// Stack `(H, W, 3)` images into `(B, maxH, maxW, 3)`.
///
/// An empty list produces the placeholder frame.
pub fn stack_images(images: &[Tensor]) -> Result<Tensor> {
    if images.is_empty() {
        return Ok(ImageBatch::placeholder()?.images);
    }
    let (height, width) = max_extent(images);
    stack_padded(images, height, width)
}

/// Stack images and masks with the same padding.
///
/// Masks are `(H, W)` and must pair one-to-one with `images`. Padding is
/// zero-valued and always appended at the bottom and right edges.
pub fn stack_with_masks(images: &[Tensor], masks: &[Tensor]) -> Result<(Tensor, Tensor)> {
    if images.len() != masks.len() {
        return Err(anyhow!(
            "cannot stack {} images with {} masks",
            images.len(),
            masks.len()
        )
        .into());
    }

    if images.is_empty() {
        let placeholder = ImageBatch::placeholder()?;
        return Ok((placeholder.images, placeholder.masks));
    }

    let (height, width) = max_extent(images);
    let images = stack_padded(images, height, width)?;
    let masks = stack_padded(masks, height, width)?;
    Ok((images, masks))
}

fn max_extent(tensors: &[Tensor]) -> (usize, usize) {
    tensors.iter().fold((0, 0), |(h, w), t| {
        let dims = t.dims();
        (h.max(dims[0]), w.max(dims[1]))
    })
}

fn stack_padded(tensors: &[Tensor], height: usize, width: usize) -> Result<Tensor> {
    let padded = tensors
        .iter()
        .map(|t| pad_bottom_right(t, height, width))
        .collect::<Result<Vec<_>>>()?;
    Ok(Tensor::stack(&padded, 0)?)
}

/// Zero-pad dims 0 (rows) and 1 (columns) up to `height` x `width`.
fn pad_bottom_right(tensor: &Tensor, height: usize, width: usize) -> Result<Tensor> {
    let dims = tensor.dims();
    let (pad_h, pad_w) = (height - dims[0], width - dims[1]);

    let mut out = tensor.clone();
    if pad_h > 0 {
        out = out.pad_with_zeros(0, 0, pad_h)?;
    }
    if pad_w > 0 {
        out = out.pad_with_zeros(1, 0, pad_w)?;
    }
    Ok(out)
}
