//! Image handling: grid planning plus a pure Rust JPEG backend.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Decode** | `image::ImageReader` |
//! | **Crop + encode tile** | `crop_imm` + `JpegEncoder` |
//!
//! The module is split into:
//! - **Grid**: Pure tile-grid arithmetic (unit testable)
//! - **Parameters**: Data structures describing one tile write
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
pub mod grid;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use grid::{Axis, GridError, GridPlan, TileBounds};
pub use params::CropParams;
pub use rust_backend::RustBackend;
