//! Pure Rust JPEG backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::image_dimensions` (header only) |
//! | Decode | `image::ImageReader` |
//! | Crop | `image::DynamicImage::crop_imm` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::CropParams;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, ImageReader};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Pure Rust backend using the `image` crate.
///
/// Tiles keep the color layout of their source. Encoding quality is the
/// encoder's default.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn save_jpeg(img: &DynamicImage, path: &Path) -> Result<(), BackendError> {
    let file = std::fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    let encoder = JpegEncoder::new(&mut writer);
    img.write_with_encoder(encoder)
        .map_err(|e| BackendError::Encode(format!("{}: {}", path.display(), e)))?;
    writer.flush()?;
    Ok(())
}

impl ImageBackend for RustBackend {
    type Image = DynamicImage;

    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = image::image_dimensions(path)
            .map_err(|e| BackendError::Decode(format!("failed to read dimensions: {e}")))?;
        Ok(Dimensions { width, height })
    }

    fn open(&self, path: &Path) -> Result<DynamicImage, BackendError> {
        ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    fn dimensions(&self, image: &DynamicImage) -> Dimensions {
        let (width, height) = image.dimensions();
        Dimensions { width, height }
    }

    fn write_tile(&self, image: &DynamicImage, params: &CropParams) -> Result<(), BackendError> {
        let tile = image.crop_imm(params.x, params.y, params.width, params.height);
        save_jpeg(&tile, &params.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::create_test_jpeg;

    #[test]
    fn identify_synthetic_jpeg() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("beach.jpg");
        create_test_jpeg(&path, 200, 150);

        let dims = RustBackend::new().identify(&path).unwrap();
        assert_eq!(
            dims,
            Dimensions {
                width: 200,
                height: 150
            }
        );
    }

    #[test]
    fn identify_nonexistent_file_errors() {
        let result = RustBackend::new().identify(Path::new("/nonexistent/beach.jpg"));
        assert!(result.is_err());
    }

    #[test]
    fn open_rejects_non_image_bytes() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("notes.jpg");
        std::fs::write(&path, b"field notes, not a photo").unwrap();

        let result = RustBackend::new().open(&path);
        assert!(matches!(result, Err(BackendError::Decode(_))));
    }

    #[test]
    fn write_tile_crops_exact_size() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("beach.jpg");
        create_test_jpeg(&source, 300, 200);

        let backend = RustBackend::new();
        let image = backend.open(&source).unwrap();
        assert_eq!(
            backend.dimensions(&image),
            Dimensions {
                width: 300,
                height: 200
            }
        );

        let output = tmp.path().join("tile.jpg");
        backend
            .write_tile(
                &image,
                &CropParams {
                    output: output.clone(),
                    x: 210,
                    y: 133,
                    width: 90,
                    height: 67,
                },
            )
            .unwrap();

        let (w, h) = image::image_dimensions(&output).unwrap();
        assert_eq!((w, h), (90, 67));
    }

    #[test]
    fn write_tile_into_missing_directory_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("beach.jpg");
        create_test_jpeg(&source, 100, 100);

        let backend = RustBackend::new();
        let image = backend.open(&source).unwrap();
        let result = backend.write_tile(
            &image,
            &CropParams {
                output: tmp.path().join("missing/tile.jpg"),
                x: 0,
                y: 0,
                width: 10,
                height: 10,
            },
        );
        assert!(matches!(result, Err(BackendError::Io(_))));
    }
}
