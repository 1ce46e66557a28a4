// tests/decode_orientation.rs

use folderfeed::loader::{LoadedImage, decode_image};
use folderfeed_test_utils::fixtures::write_jpeg_with_orientation;
use folderfeed_test_utils::init_tracing;
use image::{Rgb, RgbImage};
use tempfile::TempDir;

/// 32 wide x 16 tall: left half white, right half black.
fn half_white() -> RgbImage {
    RgbImage::from_fn(32, 16, |x, _| {
        if x < 16 { Rgb([255, 255, 255]) } else { Rgb([0, 0, 0]) }
    })
}

fn brightness(image: &LoadedImage, row: usize, col: usize) -> f32 {
    let px = image
        .pixels
        .get(row)
        .unwrap()
        .get(col)
        .unwrap()
        .to_vec1::<f32>()
        .unwrap();
    px.iter().sum::<f32>() / 3.0
}

#[test]
fn without_orientation_the_image_is_unchanged() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = write_jpeg_with_orientation(dir.path(), "plain.jpg", &half_white(), 1);

    let image = decode_image(&path).unwrap();
    assert_eq!((image.height(), image.width()), (16, 32));
    assert!(brightness(&image, 8, 4) > 0.9);
    assert!(brightness(&image, 8, 28) < 0.1);
}

#[test]
fn orientation_6_rotates_clockwise() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = write_jpeg_with_orientation(dir.path(), "cw.jpg", &half_white(), 6);

    let image = decode_image(&path).unwrap();
    assert_eq!((image.height(), image.width()), (32, 16));
    // The white left half ends up on top.
    assert!(brightness(&image, 4, 8) > 0.9);
    assert!(brightness(&image, 28, 8) < 0.1);
}

#[test]
fn orientation_8_rotates_counter_clockwise() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = write_jpeg_with_orientation(dir.path(), "ccw.jpg", &half_white(), 8);

    let image = decode_image(&path).unwrap();
    assert_eq!((image.height(), image.width()), (32, 16));
    // The white left half ends up at the bottom.
    assert!(brightness(&image, 28, 8) > 0.9);
    assert!(brightness(&image, 4, 8) < 0.1);
}
