// tests/loader_listing.rs

use folderfeed::errors::FeedError;
use folderfeed::loader::{decode_image, list_images, open};
use folderfeed_test_utils::fixtures::{frame_folder, write_bytes, write_rgb_png, write_rgba_png};
use folderfeed_test_utils::init_tracing;
use tempfile::TempDir;

fn names(paths: &[std::path::PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn missing_folder_is_not_found() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("does-not-exist");

    match list_images(&missing, true) {
        Err(FeedError::NotFound(msg)) => assert!(msg.contains("does-not-exist")),
        other => panic!("expected NotFound, got {other:?}"),
    }
    assert!(matches!(open(&missing, true), Err(FeedError::NotFound(_))));
}

#[test]
fn empty_folder_lists_nothing_but_cannot_be_opened() {
    init_tracing();
    let dir = TempDir::new().unwrap();

    assert!(list_images(dir.path(), true).unwrap().is_empty());
    assert!(matches!(open(dir.path(), true), Err(FeedError::NotFound(_))));
}

#[test]
fn extension_filter_is_case_insensitive_and_skips_other_files() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    write_rgb_png(dir.path(), "b.PNG", 4, 4, [0, 0, 0]);
    write_rgb_png(dir.path(), "a.png", 4, 4, [0, 0, 0]);
    write_bytes(dir.path(), "notes.txt", b"hello");
    write_bytes(dir.path(), "README", b"no extension");
    std::fs::create_dir(dir.path().join("nested.png")).unwrap();

    let files = list_images(dir.path(), true).unwrap();
    assert_eq!(names(&files), vec!["a.png", "b.PNG"]);
}

#[test]
fn sorted_listing_is_stable_across_calls() {
    init_tracing();
    let dir = frame_folder(5);

    let first = list_images(dir.path(), true).unwrap();
    let second = list_images(dir.path(), true).unwrap();

    assert_eq!(first, second);
    assert_eq!(
        names(&first),
        vec![
            "frame_000.png",
            "frame_001.png",
            "frame_002.png",
            "frame_003.png",
            "frame_004.png"
        ]
    );
}

#[test]
fn unsorted_listing_has_the_same_files() {
    init_tracing();
    let dir = frame_folder(4);

    let mut unsorted = names(&list_images(dir.path(), false).unwrap());
    unsorted.sort();
    assert_eq!(unsorted, names(&list_images(dir.path(), true).unwrap()));
}

#[test]
fn sequence_skips_files_that_fail_to_decode() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    write_rgb_png(dir.path(), "a.png", 4, 4, [255, 0, 0]);
    write_bytes(dir.path(), "b.png", b"definitely not a png");
    write_rgb_png(dir.path(), "c.png", 4, 4, [0, 0, 255]);

    let (total, mut sequence) = open(dir.path(), true).unwrap();
    assert_eq!(total, 3);

    let loaded: Vec<_> = sequence.by_ref().collect();
    assert_eq!(loaded.len(), 2);
    assert_eq!(names(&[loaded[0].path.clone(), loaded[1].path.clone()]), vec!["a.png", "c.png"]);
    assert_eq!(sequence.skipped(), 1);
    assert!(sequence.is_exhausted());
}

#[test]
fn decode_reports_bad_files() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let bad = write_bytes(dir.path(), "bad.jpg", b"\x00\x01\x02");

    match decode_image(&bad) {
        Err(FeedError::Decode { path, .. }) => assert_eq!(path, bad),
        other => panic!("expected Decode error, got {other:?}"),
    }
}

#[test]
fn decoded_pixels_are_normalised_rgb() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = write_rgb_png(dir.path(), "red.png", 3, 2, [255, 0, 0]);

    let image = decode_image(&path).unwrap();
    assert_eq!(image.pixels.dims(), &[2, 3, 3]);
    assert!(image.alpha.is_none());

    let values = image.pixels.flatten_all().unwrap().to_vec1::<f32>().unwrap();
    for px in values.chunks(3) {
        assert_eq!(px, &[1.0, 0.0, 0.0]);
    }

    let mask = image.mask().unwrap().flatten_all().unwrap().to_vec1::<f32>().unwrap();
    assert!(mask.iter().all(|&m| m == 0.0));
}

#[test]
fn mask_is_inverted_alpha() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = write_rgba_png(dir.path(), "clear.png", 2, 2, [10, 20, 30, 0]);

    let image = decode_image(&path).unwrap();
    assert!(image.alpha.is_some());

    let mask = image.mask().unwrap();
    assert_eq!(mask.dims(), &[2, 2]);
    let values = mask.flatten_all().unwrap().to_vec1::<f32>().unwrap();
    assert!(values.iter().all(|&m| (m - 1.0).abs() < 1e-6));
}
