//! Parameter types for image operations.
//!
//! These structs describe *what* to write, not *how*. They are the interface
//! between the pipeline (which decides where every tile goes) and the
//! [`backend`](super::backend) (which does the pixel work), so a mock backend
//! can record tile writes without touching any pixels.

use super::grid::TileBounds;
use std::path::PathBuf;

/// One tile to crop out of an already-decoded source image and encode.
#[derive(Debug, Clone, PartialEq)]
pub struct CropParams {
    pub output: PathBuf,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropParams {
    /// Build crop parameters from grid bounds that were already checked
    /// against the image extent (so every coordinate is non-negative).
    pub fn from_bounds(bounds: &TileBounds, output: PathBuf) -> Self {
        Self {
            output,
            x: bounds.begin_x as u32,
            y: bounds.begin_y as u32,
            width: bounds.width(),
            height: bounds.height(),
        }
    }
}
