//! Tile filename convention.
//!
//! Every tile is named after the beach, the source photo and its grid cell:
//!
//! ```text
//! {beach_name}_{source_stem}_tile_{i}_{j}.jpg
//! ```
//!
//! - `islandbeachstatepark` + `DJI_0042.JPG` + cell (3, 7)
//!   → `islandbeachstatepark_DJI_0042_tile_3_7.jpg`
//!
//! The name is the only link between a manifest row and its tile file, so it
//! must be unique within a beach directory. Distinct source stems guarantee
//! that; two sources that differ only in extension case (`a.jpg`, `a.JPG`)
//! would collide and are rejected by the scanner.

use std::path::Path;

/// Extension written for every tile.
pub const TILE_EXTENSION: &str = "jpg";

/// Source filename without its extension, as used in tile names.
///
/// Only the last extension is stripped: `survey.2017.jpg` → `survey.2017`.
pub fn source_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Tile filename for cell `(i, j)` of a source image.
pub fn tile_file_name(beach_name: &str, source_stem: &str, i: u32, j: u32) -> String {
    format!("{beach_name}_{source_stem}_tile_{i}_{j}.{TILE_EXTENSION}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_name_joins_beach_stem_and_cell() {
        assert_eq!(
            tile_file_name("islandbeachstatepark", "DJI_0042", 3, 7),
            "islandbeachstatepark_DJI_0042_tile_3_7.jpg"
        );
    }

    #[test]
    fn tile_name_first_cell() {
        assert_eq!(tile_file_name("b", "img", 0, 0), "b_img_tile_0_0.jpg");
    }

    #[test]
    fn stem_strips_uppercase_extension() {
        assert_eq!(source_stem(Path::new("/data/DJI_0042.JPG")), "DJI_0042");
    }

    #[test]
    fn stem_keeps_inner_dots() {
        assert_eq!(
            source_stem(Path::new("/data/survey.2017.jpg")),
            "survey.2017"
        );
    }

    #[test]
    fn stem_without_extension() {
        assert_eq!(source_stem(Path::new("plain")), "plain");
    }
}
