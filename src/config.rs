//! Run configuration.
//!
//! Every run needs the survey's metadata plus a handful of tiling options.
//! Values come from three layers, each overriding the one before:
//!
//! 1. stock defaults (below)
//! 2. an optional TOML file (`--config survey.toml`)
//! 3. command-line flags
//!
//! ## Configuration Options
//!
//! ```toml
//! # Required
//! beach_name = "islandbeachstatepark"            # output directory + tile name prefix
//! beach_display_name = "Island Beach State Park" # manifest `beach` column
//! region = "New Jersey"                          # manifest `region` column
//! date = "17/11/2017"                            # manifest `date` column, passed through as-is
//! survey_id = 25                                 # subject ids start at survey_id * 100000 + 1
//! source_dir = "data/statepark"                  # directory of .jpg photos (not recursive)
//!
//! # Optional - defaults shown
//! output_dir = "zooniverse_tiles"
//! tile_width = 90
//! tile_height = 67
//! overlap = 0.1
//! attribution = "Peter Kohler"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::manifest::IDS_PER_SURVEY;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Parameters for one tiling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Machine key for the beach. Names the output directory and prefixes every tile.
    pub beach_name: String,
    /// Human-readable beach name written to the manifest.
    pub beach_display_name: String,
    /// Region written to the manifest.
    pub region: String,
    /// Survey date written to the manifest verbatim.
    pub date: String,
    /// Seeds the subject-id block.
    pub survey_id: u64,
    /// Directory holding the survey's `.jpg` photos.
    pub source_dir: PathBuf,
    /// Root of the output tree; tiles land in `output_dir/beach_name/`.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_tile_width")]
    pub tile_width: u32,
    #[serde(default = "default_tile_height")]
    pub tile_height: u32,
    /// Requested overlap between neighbouring tiles, as a fraction of the tile size.
    #[serde(default = "default_overlap")]
    pub overlap: f64,
    #[serde(default = "default_attribution")]
    pub attribution: String,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("zooniverse_tiles")
}

fn default_tile_width() -> u32 {
    90
}

fn default_tile_height() -> u32 {
    67
}

fn default_overlap() -> f64 {
    0.1
}

fn default_attribution() -> String {
    "Peter Kohler".to_string()
}

impl RunConfig {
    /// Config with the given survey metadata and every optional field at its default.
    pub fn new(
        beach_name: &str,
        beach_display_name: &str,
        region: &str,
        date: &str,
        survey_id: u64,
        source_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            beach_name: beach_name.to_string(),
            beach_display_name: beach_display_name.to_string(),
            region: region.to_string(),
            date: date.to_string(),
            survey_id,
            source_dir: source_dir.into(),
            output_dir: default_output_dir(),
            tile_width: default_tile_width(),
            tile_height: default_tile_height(),
            overlap: default_overlap(),
            attribution: default_attribution(),
        }
    }

    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.beach_name.trim().is_empty() {
            return Err(ConfigError::Validation("beach_name must not be empty".into()));
        }
        if self.beach_name.contains(['/', '\\']) || self.beach_name == ".." {
            return Err(ConfigError::Validation(
                "beach_name must not contain path separators".into(),
            ));
        }
        if self.tile_width == 0 || self.tile_height == 0 {
            return Err(ConfigError::Validation(
                "tile_width and tile_height must be non-zero".into(),
            ));
        }
        if !self.overlap.is_finite() || !(0.0..1.0).contains(&self.overlap) {
            return Err(ConfigError::Validation(
                "overlap must be a fraction in [0, 1)".into(),
            ));
        }
        if self
            .survey_id
            .checked_mul(IDS_PER_SURVEY)
            .and_then(|seed| seed.checked_add(IDS_PER_SURVEY - 1))
            .is_none()
        {
            return Err(ConfigError::Validation(format!(
                "survey_id {} is too large",
                self.survey_id
            )));
        }
        Ok(())
    }

    /// Directory all tiles and the manifest of this run are written to.
    pub fn beach_dir(&self) -> PathBuf {
        self.output_dir.join(&self.beach_name)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(value)
}

/// Merge the optional file layer and the flag layer, then deserialize and validate.
///
/// Missing defaulted keys are filled by serde; missing required keys are
/// reported by name.
pub fn resolve_config(
    file: Option<toml::Value>,
    overrides: toml::Value,
) -> Result<RunConfig, ConfigError> {
    let base = toml::Value::Table(toml::map::Map::new());
    let merged = match file {
        Some(file) => merge_toml(base, file),
        None => base,
    };
    let merged = merge_toml(merged, overrides);
    let config: RunConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock config file with every key and explanation.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Zooniverse tile generator - survey configuration
# ==================================================
#
# Pass with:  zooniverse-tiles --config survey.toml run
# Any key can also be given (or overridden) on the command line.

# ---------------------------------------------------------------------------
# Survey metadata (required)
# ---------------------------------------------------------------------------

# Machine key for the beach. Names the output directory and prefixes every
# tile file name. No slashes.
beach_name = "islandbeachstatepark"

# Written to the manifest `beach` column.
beach_display_name = "Island Beach State Park"

# Written to the manifest `region` column.
region = "New Jersey"

# Written to the manifest `date` column exactly as given.
date = "17/11/2017"

# Subject ids for this survey start at survey_id * 100000 + 1.
# A survey can hold at most 99999 tiles.
survey_id = 25

# Directory holding the survey's .jpg photos. Not searched recursively.
source_dir = "data/statepark"

# ---------------------------------------------------------------------------
# Output and tiling (optional, defaults shown)
# ---------------------------------------------------------------------------

# Tiles and manifest.csv are written to <output_dir>/<beach_name>/.
output_dir = "zooniverse_tiles"

# Size of every tile in pixels.
tile_width = 90
tile_height = 67

# Requested overlap between neighbouring tiles (fraction of the tile, 0 <= overlap < 1).
# The effective overlap is adjusted per image so the last tile ends on the edge.
overlap = 0.1

# Written to the manifest `attribution` column.
attribution = "Peter Kohler"
"##
}
