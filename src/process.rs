//! Tiling run.
//!
//! Stage 2 of the pipeline. Takes the source list from the scan stage and,
//! for every photo in order:
//!
//! 1. decodes it once,
//! 2. plans its grid ([`GridPlan`]),
//! 3. crops and writes every tile, columns outer and rows inner,
//! 4. appends one manifest row per tile.
//!
//! The manifest is written once, after the last photo.
//!
//! ## Output Structure
//!
//! ```text
//! zooniverse_tiles/
//! └── islandbeachstatepark/
//!     ├── manifest.csv
//!     ├── islandbeachstatepark_DJI_0041_tile_0_0.jpg
//!     ├── islandbeachstatepark_DJI_0041_tile_0_1.jpg
//!     └── ...
//! ```
//!
//! ## Failure
//!
//! The run stops at the first photo that cannot be decoded, planned or
//! written. Tiles already written stay on disk; the manifest is not written.
//! Every per-photo error names the photo.

use crate::config::RunConfig;
use crate::imaging::{
    BackendError, CropParams, Dimensions, GridError, GridPlan, ImageBackend, RustBackend,
    TileBounds,
};
use crate::manifest::{IDS_PER_SURVEY, MANIFEST_FILE_NAME, ManifestBuilder, ManifestError};
use crate::naming::{source_stem, tile_file_name};
use crate::scan::{self, ScanError};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Cannot create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),
    #[error("{}: {source}", path.display())]
    Grid { path: PathBuf, source: GridError },
    #[error("{}: {source}", path.display())]
    Codec { path: PathBuf, source: BackendError },
    #[error("{}: {source}", path.display())]
    TileLimit { path: PathBuf, source: ManifestError },
    #[error("Cannot write manifest {}: {source}", path.display())]
    ManifestWrite { path: PathBuf, source: ManifestError },
}

/// One tile as produced by the run.
#[derive(Debug, Clone, PartialEq)]
pub struct TileRecord {
    pub i: u32,
    pub j: u32,
    pub bounds: TileBounds,
    pub file_name: String,
    pub subject_id: u64,
}

/// Progress events sent while a run is in flight.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    /// Output directory resolved, `images` photos found.
    Started {
        output_dir: PathBuf,
        images: usize,
    },
    /// A photo was decoded and its grid planned.
    ImageStarted {
        source: PathBuf,
        dimensions: Dimensions,
        plan: GridPlan,
    },
    TileWritten {
        tile: TileRecord,
        output: PathBuf,
    },
    ManifestWritten {
        path: PathBuf,
        rows: usize,
    },
}

/// Per-photo outcome of a run.
#[derive(Debug, Clone)]
pub struct ImageSummary {
    pub source: PathBuf,
    pub plan: GridPlan,
    pub tiles: Vec<TileRecord>,
}

#[derive(Debug)]
pub struct RunResult {
    pub output_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub images: Vec<ImageSummary>,
    pub manifest: ManifestBuilder,
}

impl RunResult {
    pub fn tile_count(&self) -> usize {
        self.manifest.len()
    }
}

fn emit(events: &Option<Sender<ProcessEvent>>, event: ProcessEvent) {
    if let Some(tx) = events {
        // A dropped receiver only loses progress output.
        let _ = tx.send(event);
    }
}

/// Run with the production JPEG backend.
pub fn process(
    config: &RunConfig,
    events: Option<Sender<ProcessEvent>>,
) -> Result<RunResult, ProcessError> {
    process_with_backend(&RustBackend::new(), config, events)
}

/// Run using a specific backend (allows testing with mock).
pub fn process_with_backend<B: ImageBackend>(
    backend: &B,
    config: &RunConfig,
    events: Option<Sender<ProcessEvent>>,
) -> Result<RunResult, ProcessError> {
    let images = scan::list_source_images(&config.source_dir)?;
    let beach_dir = config.beach_dir();
    let output_dir = scan::absolute_path(&beach_dir)
        .and_then(|dir| std::fs::create_dir_all(&dir).map(|()| dir))
        .map_err(|e| ProcessError::OutputDir {
            path: beach_dir,
            source: e,
        })?;
    emit(
        &events,
        ProcessEvent::Started {
            output_dir: output_dir.clone(),
            images: images.len(),
        },
    );

    let mut manifest = ManifestBuilder::from_config(config)?;
    let mut summaries = Vec::with_capacity(images.len());
    for source in &images {
        let summary = tile_image(backend, config, source, &output_dir, &mut manifest, &events)?;
        summaries.push(summary);
    }

    let manifest_path = output_dir.join(MANIFEST_FILE_NAME);
    manifest
        .write_to_path(&manifest_path)
        .map_err(|e| ProcessError::ManifestWrite {
            path: manifest_path.clone(),
            source: e,
        })?;
    emit(
        &events,
        ProcessEvent::ManifestWritten {
            path: manifest_path.clone(),
            rows: manifest.len(),
        },
    );

    Ok(RunResult {
        output_dir,
        manifest_path,
        images: summaries,
        manifest,
    })
}

/// Plan every tile of one photo before anything is written, so a bounds or
/// id-block failure leaves no partial tile set for that photo.
fn plan_tiles(
    config: &RunConfig,
    source: &Path,
    plan: &GridPlan,
    manifest: &ManifestBuilder,
) -> Result<Vec<(u32, u32, TileBounds, String)>, ProcessError> {
    let remaining = manifest.remaining();
    if plan.tile_count() > remaining {
        return Err(ProcessError::TileLimit {
            path: source.to_path_buf(),
            source: ManifestError::TooManyTiles {
                survey_id: config.survey_id,
                max: IDS_PER_SURVEY - 1,
            },
        });
    }

    let stem = source_stem(source);
    plan.cells()
        .map(|(i, j)| -> Result<_, ProcessError> {
            let bounds = plan.tile_bounds(i, j).map_err(|e| ProcessError::Grid {
                path: source.to_path_buf(),
                source: e,
            })?;
            Ok((i, j, bounds, tile_file_name(&config.beach_name, &stem, i, j)))
        })
        .collect()
}

fn tile_image<B: ImageBackend>(
    backend: &B,
    config: &RunConfig,
    source: &Path,
    output_dir: &Path,
    manifest: &mut ManifestBuilder,
    events: &Option<Sender<ProcessEvent>>,
) -> Result<ImageSummary, ProcessError> {
    let codec_err = |e| ProcessError::Codec {
        path: source.to_path_buf(),
        source: e,
    };

    let image = backend.open(source).map_err(codec_err)?;
    let dimensions = backend.dimensions(&image);
    let plan = GridPlan::compute(
        dimensions.width,
        dimensions.height,
        config.tile_width,
        config.tile_height,
        config.overlap,
    )
    .map_err(|e| ProcessError::Grid {
        path: source.to_path_buf(),
        source: e,
    })?;
    emit(
        events,
        ProcessEvent::ImageStarted {
            source: source.to_path_buf(),
            dimensions,
            plan,
        },
    );

    let cells = plan_tiles(config, source, &plan, manifest)?;
    let mut tiles = Vec::with_capacity(cells.len());
    for (i, j, bounds, file_name) in cells {
        let output = output_dir.join(&file_name);
        backend
            .write_tile(&image, &CropParams::from_bounds(&bounds, output.clone()))
            .map_err(codec_err)?;

        let subject_id = manifest.push(&file_name)?;
        let tile = TileRecord {
            i,
            j,
            bounds,
            file_name,
            subject_id,
        };
        emit(
            events,
            ProcessEvent::TileWritten {
                tile: tile.clone(),
                output,
            },
        );
        tiles.push(tile);
    }

    Ok(ImageSummary {
        source: source.to_path_buf(),
        plan,
        tiles,
    })
}

/// Grid plan for every source photo, without decoding or writing anything.
pub fn plan_with_backend<B: ImageBackend>(
    backend: &B,
    config: &RunConfig,
) -> Result<Vec<(PathBuf, GridPlan)>, ProcessError> {
    let images = scan::list_source_images(&config.source_dir)?;
    images
        .into_iter()
        .map(|source| -> Result<_, ProcessError> {
            let dims = backend.identify(&source).map_err(|e| ProcessError::Codec {
                path: source.clone(),
                source: e,
            })?;
            let plan = GridPlan::compute(
                dims.width,
                dims.height,
                config.tile_width,
                config.tile_height,
                config.overlap,
            )
            .map_err(|e| ProcessError::Grid {
                path: source.clone(),
                source: e,
            })?;
            Ok((source, plan))
        })
        .collect()
}
