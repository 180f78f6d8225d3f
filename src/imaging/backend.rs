//! Image backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the operations the tiling pipeline
//! needs: identify, open, and write one cropped tile.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), which decodes and
//! encodes JPEG with the `image` crate.

use super::params::CropParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("encode failed: {0}")]
    Encode(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image backends.
///
/// A source image is opened (decoded) once and then every tile of its grid is
/// cropped from the same decoded buffer.
pub trait ImageBackend {
    /// Decoded source image held while its tiles are written.
    type Image;

    /// Get image dimensions without a full decode.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Decode a source image.
    fn open(&self, path: &Path) -> Result<Self::Image, BackendError>;

    /// Dimensions of an already decoded image.
    fn dimensions(&self, image: &Self::Image) -> Dimensions;

    /// Crop one tile out of `image` and encode it to `params.output`.
    fn write_tile(&self, image: &Self::Image, params: &CropParams) -> Result<(), BackendError>;
}
