//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Run
//!
//! ```text
//! Saving tiles to /data/zooniverse_tiles/islandbeachstatepark (2 images)
//!
//! DJI_0041.JPG
//!     Image: 1000x750
//!     Tiles: 12 x 12 = 144 (90x67)
//!     Overlap: 8.08% horizontal, 7.33% vertical
//!     Tile (0, 0) x: (0, 90), y: (0, 67) -> islandbeachstatepark_DJI_0041_tile_0_0.jpg
//!     ...
//!
//! Manifest: /data/zooniverse_tiles/islandbeachstatepark/manifest.csv (288 rows)
//! ```
//!
//! Per-tile lines are only shown with `--verbose`.
//!
//! ## Plan
//!
//! ```text
//! 001 DJI_0041.JPG  1000x750  12 x 12 = 144 tiles  overlap 8.08% / 7.33%
//! 002 DJI_0042.JPG  4000x3000  ...
//!
//! 288 tiles from 2 images
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::imaging::{Dimensions, GridPlan};
use crate::process::ProcessEvent;
use std::path::{Path, PathBuf};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

fn grid_summary(plan: &GridPlan) -> String {
    format!(
        "{} x {} = {}",
        plan.horizontal_tiles + 1,
        plan.vertical_tiles + 1,
        plan.tile_count()
    )
}

/// Lines for one progress event. Tile lines are produced only when `verbose`.
pub fn format_process_event(event: &ProcessEvent, verbose: bool) -> Vec<String> {
    match event {
        ProcessEvent::Started { output_dir, images } => vec![format!(
            "Saving tiles to {} ({} image{})",
            output_dir.display(),
            images,
            if *images == 1 { "" } else { "s" }
        )],
        ProcessEvent::ImageStarted {
            source,
            dimensions: Dimensions { width, height },
            plan,
        } => vec![
            String::new(),
            file_name(source),
            format!("{}Image: {}x{}", indent(1), width, height),
            format!(
                "{}Tiles: {} ({}x{})",
                indent(1),
                grid_summary(plan),
                plan.tile_width,
                plan.tile_height
            ),
            format!(
                "{}Overlap: {} horizontal, {} vertical",
                indent(1),
                percent(plan.adjusted_overlap_h),
                percent(plan.adjusted_overlap_v)
            ),
        ],
        ProcessEvent::TileWritten { tile, .. } if verbose => vec![format!(
            "{}Tile ({}, {}) {} -> {}",
            indent(1),
            tile.i,
            tile.j,
            tile.bounds,
            tile.file_name
        )],
        ProcessEvent::TileWritten { .. } => Vec::new(),
        ProcessEvent::ManifestWritten { path, rows } => vec![
            String::new(),
            format!("Manifest: {} ({} rows)", path.display(), rows),
        ],
    }
}

/// Lines for the `plan` command.
pub fn format_plan_output(plans: &[(PathBuf, GridPlan)]) -> Vec<String> {
    let mut lines: Vec<String> = plans
        .iter()
        .enumerate()
        .map(|(idx, (source, plan))| {
            format!(
                "{} {}  {}x{}  {} tiles  overlap {} / {}",
                format_index(idx + 1),
                file_name(source),
                plan.input_width,
                plan.input_height,
                grid_summary(plan),
                percent(plan.adjusted_overlap_h),
                percent(plan.adjusted_overlap_v)
            )
        })
        .collect();

    let total = plans
        .iter()
        .fold(0u64, |sum, (_, p)| sum.saturating_add(p.tile_count()));
    lines.push(String::new());
    lines.push(format!(
        "{} tiles from {} image{}",
        total,
        plans.len(),
        if plans.len() == 1 { "" } else { "s" }
    ));
    lines
}

pub fn print_plan_output(plans: &[(PathBuf, GridPlan)]) {
    for line in format_plan_output(plans) {
        println!("{}", line);
    }
}
