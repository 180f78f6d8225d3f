//! # Zooniverse Tiles
//!
//! Slices beach survey photographs into a grid of overlapping, fixed-size
//! tiles and writes a Zooniverse subject manifest alongside them, ready for
//! upload to a citizen-science labeling project.
//!
//! # Pipeline
//!
//! ```text
//! 1. Scan     source_dir/  →  sorted .jpg list
//! 2. Process  each photo   →  grid plan → tiles + manifest rows
//! 3. Finish   rows         →  output_dir/beach_name/manifest.csv
//! ```
//!
//! Everything runs on one thread, in order. Subject ids and manifest rows
//! depend only on the sorted photo list, so re-running a survey produces the
//! same manifest.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Lists the survey photos in the source directory |
//! | [`imaging`] | Grid arithmetic and the JPEG crop/encode backend |
//! | [`naming`] | Tile filename convention |
//! | [`manifest`] | Subject-id allocation and CSV manifest writing |
//! | [`process`] | The tiling run: decode, plan, write tiles, collect rows |
//! | [`config`] | Run parameters: defaults, TOML file, CLI overrides |
//! | [`output`] | CLI output formatting |
//!
//! # Grid Planning
//!
//! The requested overlap is only a starting point. For each photo the number
//! of tile steps per axis is rounded to a whole number and the overlap is
//! adjusted so the last tile ends exactly on the photo's edge: no partial
//! tiles, no reads past the border. See [`imaging::GridPlan`].

pub mod config;
pub mod imaging;
pub mod manifest;
pub mod naming;
pub mod output;
pub mod process;
pub mod scan;

#[cfg(test)]
pub(crate) mod test_helpers;
