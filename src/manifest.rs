//! Zooniverse subject manifest.
//!
//! One row per tile, in the order tiles are produced. The header is fixed by
//! the Zooniverse subject uploader:
//!
//! ```text
//! subject_id,image_name1,attribution,beach,region,date
//! 2500001,islandbeachstatepark_DJI_0041_tile_0_0.jpg,Peter Kohler,Island Beach State Park,New Jersey,17/11/2017
//! ```
//!
//! ## Subject identifiers
//!
//! Identifiers are allocated from a per-survey block: the counter starts at
//! `survey_id * 100000` and is incremented *before* each row, so the first tile
//! of survey 25 is `2500001`. A survey may hold at most 99999 tiles; allocating
//! past that would spill into the next survey's block, so it is an error.

use crate::config::RunConfig;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Width of the identifier block reserved for each survey.
pub const IDS_PER_SURVEY: u64 = 100_000;

pub const HEADER: [&str; 6] = [
    "subject_id",
    "image_name1",
    "attribution",
    "beach",
    "region",
    "date",
];

/// Manifest file name inside the beach output directory.
pub const MANIFEST_FILE_NAME: &str = "manifest.csv";

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("survey {survey_id} exceeds {max} tiles; subject ids would collide with the next survey")]
    TooManyTiles { survey_id: u64, max: u64 },
    #[error("survey id {0} is too large to seed subject ids")]
    SurveyIdOverflow(u64),
}

/// One manifest row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRow {
    pub subject_id: u64,
    pub image_name: String,
    pub attribution: String,
    pub beach: String,
    pub region: String,
    pub date: String,
}

impl ManifestRow {
    fn record(&self) -> [String; 6] {
        [
            self.subject_id.to_string(),
            self.image_name.clone(),
            self.attribution.clone(),
            self.beach.clone(),
            self.region.clone(),
            self.date.clone(),
        ]
    }
}

/// Survey metadata repeated on every row.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SurveyColumns {
    attribution: String,
    beach: String,
    region: String,
    date: String,
}

/// Owns the subject-id counter and the buffered rows for one run.
#[derive(Debug, Clone)]
pub struct ManifestBuilder {
    survey_id: u64,
    seed: u64,
    last_id: u64,
    columns: SurveyColumns,
    rows: Vec<ManifestRow>,
}

impl ManifestBuilder {
    pub fn new(
        survey_id: u64,
        attribution: &str,
        beach: &str,
        region: &str,
        date: &str,
    ) -> Result<Self, ManifestError> {
        let seed = survey_id
            .checked_mul(IDS_PER_SURVEY)
            .filter(|s| s.checked_add(IDS_PER_SURVEY - 1).is_some())
            .ok_or(ManifestError::SurveyIdOverflow(survey_id))?;
        Ok(Self {
            survey_id,
            seed,
            last_id: seed,
            columns: SurveyColumns {
                attribution: attribution.to_string(),
                beach: beach.to_string(),
                region: region.to_string(),
                date: date.to_string(),
            },
            rows: Vec::new(),
        })
    }

    pub fn from_config(config: &RunConfig) -> Result<Self, ManifestError> {
        Self::new(
            config.survey_id,
            &config.attribution,
            &config.beach_display_name,
            &config.region,
            &config.date,
        )
    }

    /// Identifier the next pushed row will receive, if the block has room.
    pub fn next_id(&self) -> Result<u64, ManifestError> {
        let next = self.last_id + 1;
        if next - self.seed >= IDS_PER_SURVEY {
            return Err(ManifestError::TooManyTiles {
                survey_id: self.survey_id,
                max: IDS_PER_SURVEY - 1,
            });
        }
        Ok(next)
    }

    /// Append a row for `image_name` and return its subject id.
    pub fn push(&mut self, image_name: &str) -> Result<u64, ManifestError> {
        let id = self.next_id()?;
        self.last_id = id;
        self.rows.push(ManifestRow {
            subject_id: id,
            image_name: image_name.to_string(),
            attribution: self.columns.attribution.clone(),
            beach: self.columns.beach.clone(),
            region: self.columns.region.clone(),
            date: self.columns.date.clone(),
        });
        Ok(id)
    }

    /// Tiles that still fit in this survey's identifier block.
    pub fn remaining(&self) -> u64 {
        IDS_PER_SURVEY - 1 - (self.last_id - self.seed)
    }

    pub fn rows(&self) -> &[ManifestRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write header and rows as CSV with minimal quoting.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), ManifestError> {
        let mut out = csv::WriterBuilder::new()
            .delimiter(b',')
            .quote(b'"')
            .quote_style(csv::QuoteStyle::Necessary)
            .terminator(csv::Terminator::CRLF)
            .from_writer(writer);
        out.write_record(HEADER)?;
        for row in &self.rows {
            out.write_record(row.record())?;
        }
        out.flush()?;
        Ok(())
    }

    /// Write the manifest to `path`, replacing any existing file.
    pub fn write_to_path(&self, path: &Path) -> Result<(), ManifestError> {
        let file = std::fs::File::create(path)?;
        self.write_csv(std::io::BufWriter::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder(survey_id: u64) -> ManifestBuilder {
        ManifestBuilder::new(
            survey_id,
            "Peter Kohler",
            "Island Beach State Park",
            "New Jersey",
            "17/11/2017",
        )
        .unwrap()
    }

    fn to_string(builder: &ManifestBuilder) -> String {
        let mut buf = Vec::new();
        builder.write_csv(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn ids_start_one_past_survey_seed() {
        let mut m = builder(25);
        assert_eq!(m.push("a_tile_0_0.jpg").unwrap(), 2_500_001);
        assert_eq!(m.push("a_tile_0_1.jpg").unwrap(), 2_500_002);
        assert_eq!(m.rows()[1].subject_id, 2_500_002);
    }

    #[test]
    fn header_only_when_empty() {
        let m = builder(25);
        assert!(m.is_empty());
        assert_eq!(
            to_string(&m),
            "subject_id,image_name1,attribution,beach,region,date\r\n"
        );
    }

    #[test]
    fn rows_repeat_survey_columns() {
        let mut m = builder(25);
        m.push("islandbeachstatepark_DJI_0041_tile_0_0.jpg").unwrap();
        let text = to_string(&m);
        let lines: Vec<&str> = text.split("\r\n").collect();
        assert_eq!(
            lines[1],
            "2500001,islandbeachstatepark_DJI_0041_tile_0_0.jpg,Peter Kohler,Island Beach State Park,New Jersey,17/11/2017"
        );
    }

    #[test]
    fn fields_quoted_only_when_needed() {
        let mut m = ManifestBuilder::new(1, "Kohler, P.", "Beach \"North\"", "NJ", "17/11/2017")
            .unwrap();
        m.push("t.jpg").unwrap();
        let text = to_string(&m);
        assert!(text.ends_with("100001,t.jpg,\"Kohler, P.\",\"Beach \"\"North\"\"\",NJ,17/11/2017\r\n"));
    }

    #[test]
    fn block_exhaustion_is_an_error() {
        let mut m = builder(7);
        m.last_id = m.seed + IDS_PER_SURVEY - 2;
        assert_eq!(m.remaining(), 1);
        assert_eq!(m.push("last.jpg").unwrap(), 799_999);
        assert!(matches!(
            m.push("overflow.jpg"),
            Err(ManifestError::TooManyTiles { survey_id: 7, .. })
        ));
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn huge_survey_id_rejected() {
        let err = ManifestBuilder::new(u64::MAX / 10, "a", "b", "c", "d").unwrap_err();
        assert!(matches!(err, ManifestError::SurveyIdOverflow(_)));
    }

    #[test]
    fn write_to_path_overwrites() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join(MANIFEST_FILE_NAME);
        std::fs::write(&path, "stale contents that are longer than the header line\n").unwrap();

        builder(25).write_to_path(&path).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "subject_id,image_name1,attribution,beach,region,date\r\n"
        );
    }
}
