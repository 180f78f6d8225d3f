//! Source image discovery.
//!
//! Stage 1 of the tiling run. Lists the survey photos in a single directory:
//!
//! ```text
//! data/statepark/
//! ├── DJI_0041.JPG        # picked up (suffix match is case-insensitive)
//! ├── DJI_0042.jpg        # picked up
//! ├── DJI_0042.dng        # ignored
//! ├── notes.txt           # ignored
//! └── rejects/            # ignored, no recursion
//!     └── DJI_0001.jpg
//! ```
//!
//! The result is sorted lexicographically by path, so tile identifiers and
//! manifest row order do not depend on the filesystem's enumeration order.
//!
//! ## Validation
//!
//! - The directory must exist and be a directory.
//! - Two photos may not share a stem (`a.jpg` and `a.JPG`): their tiles would
//!   overwrite each other.

use crate::naming::source_stem;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Cannot read source directory {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Source directory not found: {0}")]
    NotFound(PathBuf),
    #[error("Source path is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("Source images {0} and {1} produce the same tile names")]
    DuplicateStem(PathBuf, PathBuf),
}

/// Suffix of the photos a survey produces, matched case-insensitively.
const SOURCE_SUFFIX: &str = ".jpg";

/// Expand a leading `~/` and make `path` absolute against the current directory.
pub fn absolute_path(path: &Path) -> Result<PathBuf, std::io::Error> {
    let expanded = match path.strip_prefix("~") {
        Ok(rest) => match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    };
    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        Ok(std::env::current_dir()?.join(expanded))
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ScanError + use<> {
    let path = path.to_path_buf();
    move |source| ScanError::Io { path, source }
}

fn is_source_image(path: &Path) -> bool {
    path.is_file()
        && path.file_name().is_some_and(|name| {
            name.to_string_lossy()
                .to_ascii_lowercase()
                .ends_with(SOURCE_SUFFIX)
        })
}

/// List the `.jpg` files directly inside `dir`, sorted, as absolute paths.
pub fn list_source_images(dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let dir = absolute_path(dir).map_err(io_error(dir))?;
    if !dir.exists() {
        return Err(ScanError::NotFound(dir));
    }
    if !dir.is_dir() {
        return Err(ScanError::NotADirectory(dir));
    }

    let mut images: Vec<PathBuf> = fs::read_dir(&dir)
        .map_err(io_error(&dir))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| is_source_image(p))
        .collect();
    images.sort();

    let mut seen: HashMap<String, &PathBuf> = HashMap::new();
    for image in &images {
        if let Some(first) = seen.insert(source_stem(image), image) {
            return Err(ScanError::DuplicateStem(first.clone(), image.clone()));
        }
    }

    Ok(images)
}
