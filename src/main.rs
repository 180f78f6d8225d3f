use clap::{Parser, Subcommand};
use std::path::PathBuf;
use zooniverse_tiles::imaging::RustBackend;
use zooniverse_tiles::{config, output, process};

/// Survey parameters. Any flag given here overrides the `--config` file.
#[derive(clap::Args, Clone)]
struct SurveyArgs {
    /// Beach key: output sub-directory and tile name prefix
    #[arg(long, global = true)]
    beach_name: Option<String>,

    /// Beach name written to the manifest
    #[arg(long, global = true)]
    beach_display_name: Option<String>,

    /// Region written to the manifest
    #[arg(long, global = true)]
    region: Option<String>,

    /// Survey date written to the manifest as given (e.g. 17/11/2017)
    #[arg(long, global = true)]
    date: Option<String>,

    /// Survey number; subject ids start at survey_id * 100000 + 1
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(..=i64::MAX as u64))]
    survey_id: Option<u64>,

    /// Directory of .jpg survey photos
    #[arg(long, global = true)]
    source: Option<PathBuf>,

    /// Output root directory [default: zooniverse_tiles]
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Tile width in pixels [default: 90]
    #[arg(long, global = true)]
    tile_width: Option<u32>,

    /// Tile height in pixels [default: 67]
    #[arg(long, global = true)]
    tile_height: Option<u32>,

    /// Requested overlap between tiles, 0 <= overlap < 1 [default: 0.1]
    #[arg(long, global = true)]
    overlap: Option<f64>,

    /// Attribution written to the manifest [default: Peter Kohler]
    #[arg(long, global = true)]
    attribution: Option<String>,
}

impl SurveyArgs {
    /// Flags that were actually given, as a TOML table for the top config layer.
    fn to_overrides(&self) -> toml::Value {
        let mut table = toml::map::Map::new();
        let mut set = |key: &str, value: Option<toml::Value>| {
            if let Some(v) = value {
                table.insert(key.to_string(), v);
            }
        };
        let path = |p: &PathBuf| toml::Value::String(p.to_string_lossy().to_string());

        set("beach_name", self.beach_name.clone().map(toml::Value::String));
        set(
            "beach_display_name",
            self.beach_display_name.clone().map(toml::Value::String),
        );
        set("region", self.region.clone().map(toml::Value::String));
        set("date", self.date.clone().map(toml::Value::String));
        // Range-checked by clap, so the conversion cannot fail.
        set(
            "survey_id",
            self.survey_id
                .and_then(|id| i64::try_from(id).ok())
                .map(toml::Value::Integer),
        );
        set("source_dir", self.source.as_ref().map(path));
        set("output_dir", self.output.as_ref().map(path));
        set(
            "tile_width",
            self.tile_width.map(|w| toml::Value::Integer(i64::from(w))),
        );
        set(
            "tile_height",
            self.tile_height.map(|h| toml::Value::Integer(i64::from(h))),
        );
        set("overlap", self.overlap.map(toml::Value::Float));
        set(
            "attribution",
            self.attribution.clone().map(toml::Value::String),
        );
        toml::Value::Table(table)
    }
}

#[derive(Parser)]
#[command(name = "zooniverse-tiles")]
#[command(version)]
#[command(about = "Slice beach survey photos into overlapping tiles for Zooniverse")]
#[command(long_about = "\
Slice beach survey photos into overlapping tiles for Zooniverse

Every .jpg in the source directory is cut into a grid of fixed-size tiles.
The overlap between tiles is adjusted per photo so the last tile ends exactly
on the photo's edge. Tiles and a Zooniverse subject manifest are written to:

  <output>/<beach-name>/
  ├── manifest.csv                          # subject_id,image_name1,attribution,beach,region,date
  ├── <beach-name>_<photo>_tile_0_0.jpg
  ├── <beach-name>_<photo>_tile_0_1.jpg
  └── ...

Parameters come from --config (TOML) and/or flags; flags win.
Run 'zooniverse-tiles gen-config' to print a documented survey config.")]
struct Cli {
    /// Survey config file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print one line per tile written
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    survey: SurveyArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Slice every photo and write tiles plus manifest.csv
    Run,
    /// Show the tile grid for every photo without writing anything
    Plan,
    /// Print a stock survey config with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run => {
            let run_config = load_run_config(&cli)?;
            let verbose = cli.verbose;
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_process_event(&event, verbose) {
                        println!("{}", line);
                    }
                }
            });
            let result = process::process(&run_config, Some(tx));
            printer.join().unwrap();
            let result = result?;
            println!(
                "==> Done: {} tiles from {} images",
                result.tile_count(),
                result.images.len()
            );
        }
        Command::Plan => {
            let run_config = load_run_config(&cli)?;
            let plans = process::plan_with_backend(&RustBackend::new(), &run_config)?;
            output::print_plan_output(&plans);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Layer the optional config file under the command-line flags.
fn load_run_config(cli: &Cli) -> Result<config::RunConfig, config::ConfigError> {
    let file = cli
        .config
        .as_deref()
        .map(config::load_raw_config)
        .transpose()?;
    config::resolve_config(file, cli.survey.to_overrides())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn survey_id_flag_becomes_override() {
        let cli = Cli::try_parse_from(["zooniverse-tiles", "plan", "--survey-id", "25"]).unwrap();
        let overrides = cli.survey.to_overrides();
        assert_eq!(overrides["survey_id"].as_integer(), Some(25));
        assert!(overrides.get("overlap").is_none());
    }

    #[test]
    fn survey_id_beyond_toml_range_is_a_flag_error() {
        let too_big = (i64::MAX as u64 + 1).to_string();
        let err = Cli::try_parse_from(["zooniverse-tiles", "run", "--survey-id", &too_big])
            .err()
            .unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        assert!(err.to_string().contains("--survey-id"));
    }
}
