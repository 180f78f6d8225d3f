//! Tile grid arithmetic.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! A grid is planned per source image. The requested overlap is only a hint:
//! the number of tile steps per axis is rounded to a whole number, and the
//! overlap is then adjusted so that the last tile ends exactly on the image
//! edge. Tile dimensions never change, only the stride between tile origins.
//!
//! ```text
//!  0      stride     2*stride              input_width
//!  |--------|--------|--------|---- ... ---|
//!  [ tile 0     ]
//!           [ tile 1     ]
//!                    [ tile 2     ]
//!                                 [ tile n     ]
//! ```

use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("overlap must be a fraction in [0, 1), got {0}")]
    InvalidOverlap(f64),
    #[error("tile width and height must be non-zero")]
    ZeroTileSize,
    #[error("{axis} tile size {tile}px exceeds image size {image}px")]
    TileLargerThanImage { axis: Axis, tile: u32, image: u32 },
    #[error(
        "degenerate grid: {axis} tile count rounds to 0 (image {image}px, tile {tile}px, overlap {overlap})"
    )]
    Degenerate {
        axis: Axis,
        image: u32,
        tile: u32,
        overlap: f64,
    },
    #[error("{axis} tile count {steps} is too large (image {image}px, tile {tile}px, overlap {overlap})")]
    TooManyTiles {
        axis: Axis,
        steps: f64,
        image: u32,
        tile: u32,
        overlap: f64,
    },
    #[error("tile ({i}, {j}) bounds {bounds} fall outside the {width}x{height} image")]
    TileOutOfBounds {
        i: u32,
        j: u32,
        bounds: TileBounds,
        width: u32,
        height: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Horizontal => f.write_str("horizontal"),
            Axis::Vertical => f.write_str("vertical"),
        }
    }
}

/// Pixel bounds of one tile. `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileBounds {
    pub begin_x: i64,
    pub end_x: i64,
    pub begin_y: i64,
    pub end_y: i64,
}

impl TileBounds {
    pub fn width(&self) -> u32 {
        (self.end_x - self.begin_x) as u32
    }

    pub fn height(&self) -> u32 {
        (self.end_y - self.begin_y) as u32
    }
}

impl fmt::Display for TileBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "x: ({}, {}), y: ({}, {})",
            self.begin_x, self.end_x, self.begin_y, self.end_y
        )
    }
}

/// Tiling plan for a single source image.
///
/// `horizontal_tiles` and `vertical_tiles` are the index of the last cell on
/// each axis, so the grid has `(horizontal_tiles + 1) * (vertical_tiles + 1)`
/// cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPlan {
    pub input_width: u32,
    pub input_height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    pub overlap: f64,
    pub horizontal_tiles: u32,
    pub vertical_tiles: u32,
    pub adjusted_overlap_h: f64,
    pub adjusted_overlap_v: f64,
}

/// Number of tile steps along one axis plus the overlap that makes them fit exactly.
fn plan_axis(axis: Axis, image: u32, tile: u32, overlap: f64) -> Result<(u32, f64), GridError> {
    if tile > image {
        return Err(GridError::TileLargerThanImage { axis, tile, image });
    }
    let span = f64::from(image - tile);
    let tile_px = f64::from(tile);

    // Ties go to even on both axes so plans are reproducible.
    let steps = (span / (tile_px * (1.0 - overlap))).round_ties_even();
    if steps < 1.0 {
        return Err(GridError::Degenerate {
            axis,
            image,
            tile,
            overlap,
        });
    }

    // The last cell index is `steps`, so `steps + 1` cells must fit in a u32.
    if steps > f64::from(u32::MAX - 1) {
        return Err(GridError::TooManyTiles {
            axis,
            steps,
            image,
            tile,
            overlap,
        });
    }

    let exact_fit = span / steps;
    Ok((steps as u32, (tile_px - exact_fit) / tile_px))
}

impl GridPlan {
    /// Plan the grid for an image of `input_width` x `input_height` pixels.
    ///
    /// # Examples
    /// ```
    /// # use zooniverse_tiles::imaging::GridPlan;
    /// let plan = GridPlan::compute(1000, 750, 90, 67, 0.1).unwrap();
    /// assert_eq!((plan.horizontal_tiles, plan.vertical_tiles), (11, 11));
    /// assert_eq!(plan.tile_count(), 144);
    /// ```
    pub fn compute(
        input_width: u32,
        input_height: u32,
        tile_width: u32,
        tile_height: u32,
        overlap: f64,
    ) -> Result<Self, GridError> {
        if !overlap.is_finite() || !(0.0..1.0).contains(&overlap) {
            return Err(GridError::InvalidOverlap(overlap));
        }
        if tile_width == 0 || tile_height == 0 {
            return Err(GridError::ZeroTileSize);
        }

        let (horizontal_tiles, adjusted_overlap_h) =
            plan_axis(Axis::Horizontal, input_width, tile_width, overlap)?;
        let (vertical_tiles, adjusted_overlap_v) =
            plan_axis(Axis::Vertical, input_height, tile_height, overlap)?;

        Ok(Self {
            input_width,
            input_height,
            tile_width,
            tile_height,
            overlap,
            horizontal_tiles,
            vertical_tiles,
            adjusted_overlap_h,
            adjusted_overlap_v,
        })
    }

    /// Total number of tiles this plan produces.
    pub fn tile_count(&self) -> u64 {
        (u64::from(self.horizontal_tiles) + 1).saturating_mul(u64::from(self.vertical_tiles) + 1)
    }

    /// Pixel bounds of cell `(i, j)`, checked against the image extent.
    pub fn tile_bounds(&self, i: u32, j: u32) -> Result<TileBounds, GridError> {
        let width = f64::from(self.tile_width);
        let height = f64::from(self.tile_height);
        let (fi, fj) = (f64::from(i), f64::from(j));

        let begin_x = (fi * width - fi * width * self.adjusted_overlap_h).floor() as i64;
        let begin_y = (fj * height - fj * height * self.adjusted_overlap_v).floor() as i64;
        let bounds = TileBounds {
            begin_x,
            end_x: begin_x + i64::from(self.tile_width),
            begin_y,
            end_y: begin_y + i64::from(self.tile_height),
        };

        let inside = 0 <= bounds.begin_x
            && bounds.begin_x < bounds.end_x
            && bounds.end_x <= i64::from(self.input_width)
            && 0 <= bounds.begin_y
            && bounds.begin_y < bounds.end_y
            && bounds.end_y <= i64::from(self.input_height);
        if !inside {
            return Err(GridError::TileOutOfBounds {
                i,
                j,
                bounds,
                width: self.input_width,
                height: self.input_height,
            });
        }
        Ok(bounds)
    }

    /// All `(i, j)` cells in production order: columns outer, rows inner.
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32)> + use<> {
        let (last_i, last_j) = (self.horizontal_tiles, self.vertical_tiles);
        (0..=last_i).flat_map(move |i| (0..=last_j).map(move |j| (i, j)))
    }
}
