use std::{
    fs::{self, File, OpenOptions},
    io::BufWriter,
    path::{Path, PathBuf},
    time::Duration,
};

pub use cli::CLIParser;
use error::Error;
use image::{reader::read_plate_image, Region};
use pipeline::PlateAnalyzer;
use plate::UniformGridPartition;
use report::TsvReportWriter;
use settings::Settings;
use threadpool::ThreadPool;

mod cli;
pub mod color;
pub mod error;
pub mod image;
mod logger;
pub mod pipeline;
pub mod plate;
pub mod report;
pub mod saturating;
pub mod settings;
pub mod tile;

pub type Result<T> = std::result::Result<T, error::Error>;

pub struct Arguments {
    input_files: Vec<PathBuf>,
    output_dir: PathBuf,
    rows: u32,
    columns: u32,
    number_of_threads: usize,
    color_threshold: u8,
    red_gain: f32,
    blue_green_gain: f32,
    grid_region: Option<Region>,
    tile_timeout: Option<Duration>,
}

/// Outcome of a batch run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub analyzed: usize,
    pub failed: usize,
    pub reports: Vec<PathBuf>,
}

fn open_output_file(file_path: &Path) -> Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(file_path)
        .map_err(|e| Error::UnableToOpenOutputFileForWriting(file_path.display().to_string(), e))
}

fn report_path(output_dir: &Path, input_file: &Path) -> PathBuf {
    let stem = input_file
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "plate".to_owned());
    output_dir.join(format!("{}.tsv", stem))
}

fn analyze_plate(
    analyzer: &PlateAnalyzer<UniformGridPartition>,
    input_file: &Path,
    arguments: &Arguments,
) -> Result<PathBuf> {
    let image = read_plate_image(input_file)?;
    log::info!(
        "Loaded {} ({}x{})",
        input_file.display(),
        image.width(),
        image.height()
    );
    let report = analyzer.analyze(image, arguments.grid_region)?;
    let output_path = report_path(&arguments.output_dir, input_file);
    let output_file = open_output_file(&output_path)?;
    let mut writer = TsvReportWriter::new(BufWriter::new(output_file));
    report.write_to(&mut writer)?;
    log::info!(
        "Wrote {} tile records to {}",
        report.records.len(),
        output_path.display()
    );
    Ok(output_path)
}

/// Analyzes every input plate and writes one report per plate into the
/// output directory. A plate that cannot be loaded or whose grid cannot be
/// located is logged and skipped.
pub fn analyze_plates(arguments: &Arguments) -> Result<BatchSummary> {
    fs::create_dir_all(&arguments.output_dir).map_err(|e| {
        Error::UnableToOpenOutputFileForWriting(arguments.output_dir.display().to_string(), e)
    })?;
    let threadpool = ThreadPool::new(arguments.number_of_threads.max(1));
    let partition = UniformGridPartition::new(arguments.rows, arguments.columns);
    let analyzer = PlateAnalyzer::new(Settings::from(arguments), &partition, &threadpool);
    let mut summary = BatchSummary::default();
    for input_file in arguments.input_files.iter() {
        match analyze_plate(&analyzer, input_file, arguments) {
            Ok(report) => {
                summary.analyzed += 1;
                summary.reports.push(report);
            }
            Err(e) => {
                log::error!("Skipping plate {}: {}", input_file.display(), e);
                summary.failed += 1;
            }
        }
    }
    Ok(summary)
}
