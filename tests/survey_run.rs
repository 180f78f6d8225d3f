//! End-to-end tiling runs against real JPEG files.
//!
//! These go through the public API with the production backend: photos are
//! encoded to disk, tiled, and the resulting tiles and manifest are read back.

use image::{DynamicImage, RgbImage};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use zooniverse_tiles::config::RunConfig;
use zooniverse_tiles::imaging::GridPlan;
use zooniverse_tiles::manifest::HEADER;
use zooniverse_tiles::process::{self, ProcessError};
use zooniverse_tiles::scan::ScanError;

fn write_photo(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 7 % 256) as u8, (y * 3 % 256) as u8, 90])
    });
    DynamicImage::ImageRgb8(img)
        .save_with_format(path, image::ImageFormat::Jpeg)
        .unwrap();
}

fn survey(tmp: &TempDir) -> RunConfig {
    let source = tmp.path().join("statepark");
    fs::create_dir_all(&source).unwrap();
    let mut config = RunConfig::new(
        "islandbeachstatepark",
        "Island Beach State Park",
        "New Jersey",
        "17/11/2017",
        25,
        source,
    );
    config.output_dir = tmp.path().join("zooniverse_tiles");
    config
}

fn manifest_records(path: &Path) -> Vec<Vec<String>> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .unwrap()
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect()
}

#[test]
fn two_photos_share_one_id_sequence() {
    let tmp = TempDir::new().unwrap();
    let config = survey(&tmp);
    write_photo(&config.source_dir.join("DJI_0042.JPG"), 400, 300);
    write_photo(&config.source_dir.join("DJI_0041.jpg"), 1000, 750);
    fs::write(config.source_dir.join("flight_log.txt"), "alt 40m").unwrap();

    let result = process::process(&config, None).unwrap();

    let expected: u64 = [(1000, 750), (400, 300)]
        .iter()
        .map(|&(w, h)| GridPlan::compute(w, h, 90, 67, 0.1).unwrap().tile_count())
        .sum();
    let records = manifest_records(&result.manifest_path);
    assert_eq!(records.len() as u64, 1 + expected);
    assert_eq!(records[0], HEADER.map(String::from).to_vec());

    // DJI_0041 sorts first and takes the first 144 ids
    assert_eq!(records[1][0], "2500001");
    assert_eq!(records[1][1], "islandbeachstatepark_DJI_0041_tile_0_0.jpg");
    assert_eq!(records[144][1], "islandbeachstatepark_DJI_0041_tile_11_11.jpg");
    assert_eq!(records[145][0], "2500145");
    assert_eq!(records[145][1], "islandbeachstatepark_DJI_0042_tile_0_0.jpg");

    for (n, record) in records.iter().skip(1).enumerate() {
        assert_eq!(record[0], (2_500_001 + n as u64).to_string());
        assert_eq!(&record[2..], ["Peter Kohler", "Island Beach State Park", "New Jersey", "17/11/2017"]);
        let tile = config.beach_dir().join(&record[1]);
        assert_eq!(image::image_dimensions(&tile).unwrap(), (90, 67), "{}", record[1]);
    }
}

#[test]
fn empty_survey_writes_header_only() {
    let tmp = TempDir::new().unwrap();
    let config = survey(&tmp);

    let result = process::process(&config, None).unwrap();
    assert_eq!(result.tile_count(), 0);

    let entries: Vec<_> = fs::read_dir(config.beach_dir()).unwrap().collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(
        fs::read_to_string(&result.manifest_path).unwrap(),
        "subject_id,image_name1,attribution,beach,region,date\r\n"
    );
}

#[test]
fn rerun_is_byte_identical() {
    let tmp = TempDir::new().unwrap();
    let config = survey(&tmp);
    write_photo(&config.source_dir.join("a.jpg"), 500, 400);
    write_photo(&config.source_dir.join("b.jpg"), 320, 240);

    let first = process::process(&config, None).unwrap();
    let bytes = fs::read(&first.manifest_path).unwrap();
    fs::remove_dir_all(&config.output_dir).unwrap();

    let second = process::process(&config, None).unwrap();
    assert_eq!(fs::read(&second.manifest_path).unwrap(), bytes);
}

#[test]
fn missing_source_directory() {
    let tmp = TempDir::new().unwrap();
    let mut config = survey(&tmp);
    config.source_dir = tmp.path().join("not_here");

    let err = process::process(&config, None).unwrap_err();
    assert!(matches!(err, ProcessError::Scan(ScanError::NotFound(_))));
}

#[test]
fn corrupt_photo_aborts_with_its_name() {
    let tmp = TempDir::new().unwrap();
    let config = survey(&tmp);
    write_photo(&config.source_dir.join("a.jpg"), 500, 400);
    fs::write(config.source_dir.join("b.jpg"), b"\xff\xd8 truncated").unwrap();

    let err = process::process(&config, None).unwrap_err();
    assert!(matches!(err, ProcessError::Codec { .. }));
    assert!(err.to_string().contains("b.jpg"));
    assert!(!config.beach_dir().join("manifest.csv").exists());
}

#[test]
fn photo_smaller_than_tile_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let config = survey(&tmp);
    write_photo(&config.source_dir.join("thumb.jpg"), 60, 40);

    let err = process::process(&config, None).unwrap_err();
    assert!(matches!(err, ProcessError::Grid { .. }));
    assert!(err.to_string().contains("thumb.jpg"));
}
