//! Shared test utilities.
//!
//! Synthetic survey photos for tests that need real JPEG bytes on disk.

use image::{DynamicImage, RgbImage};
use std::path::Path;
use tempfile::TempDir;

/// Write a small valid JPEG with a gradient so crops are not uniform.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    DynamicImage::ImageRgb8(img)
        .save_with_format(path, image::ImageFormat::Jpeg)
        .unwrap();
}

/// A temp directory holding one JPEG per `(name, width, height)`.
pub fn setup_survey(photos: &[(&str, u32, u32)]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for &(name, width, height) in photos {
        create_test_jpeg(&tmp.path().join(name), width, height);
    }
    tmp
}
