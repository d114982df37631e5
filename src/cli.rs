use crate::image::Region;
use crate::settings::{DEFAULT_BLUE_GREEN_GAIN, DEFAULT_COLOR_THRESHOLD, DEFAULT_RED_GAIN};
use crate::settings::DEFAULT_TILE_TIMEOUT;
use crate::Arguments;
use clap::{
    arg, crate_authors, crate_description, crate_name, crate_version, value_parser, Arg,
    ArgAction, ArgMatches, Command,
};
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;
use std::{io, thread};

pub struct CLIParser {
    command: Command,
}

impl CLIParser {
    pub fn new() -> Self {
        let command = Self::create_base_command();
        let command = Self::register_arguments(command);
        CLIParser { command }
    }

    pub fn parse<I, T>(&mut self, itr: I) -> Arguments
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self
            .command
            .try_get_matches_from_mut(itr)
            .unwrap_or_else(|e| e.exit());
        Self::extract_arguments(&matches)
    }

    fn register_arguments(command: Command) -> Command {
        let command = Self::register_input_files_argument(command);
        let command = Self::register_output_dir_argument(command);
        let command = Self::register_rows_argument(command);
        let command = Self::register_columns_argument(command);
        let command = Self::register_threads_argument(command);
        let command = Self::register_color_threshold_argument(command);
        let command = Self::register_red_gain_argument(command);
        let command = Self::register_blue_green_gain_argument(command);
        let command = Self::register_grid_region_argument(command);
        Self::register_tile_timeout_argument(command)
    }

    fn register_input_files_argument(command: Command) -> Command {
        command.arg(Self::create_input_files_argument())
    }

    fn register_output_dir_argument(command: Command) -> Command {
        command.arg(Self::create_output_dir_argument())
    }

    fn register_rows_argument(command: Command) -> Command {
        command.arg(Self::create_rows_argument())
    }

    fn register_columns_argument(command: Command) -> Command {
        command.arg(Self::create_columns_argument())
    }

    fn register_threads_argument(command: Command) -> Command {
        command.arg(Self::create_threads_argument())
    }

    fn register_color_threshold_argument(command: Command) -> Command {
        command.arg(Self::create_color_threshold_argument())
    }

    fn register_red_gain_argument(command: Command) -> Command {
        command.arg(Self::create_red_gain_argument())
    }

    fn register_blue_green_gain_argument(command: Command) -> Command {
        command.arg(Self::create_blue_green_gain_argument())
    }

    fn register_grid_region_argument(command: Command) -> Command {
        command.arg(Self::create_grid_region_argument())
    }

    fn register_tile_timeout_argument(command: Command) -> Command {
        command.arg(Self::create_tile_timeout_argument())
    }

    fn create_base_command() -> Command {
        Command::new(crate_name!())
            .version(crate_version!())
            .author(crate_authors!())
            .about(crate_description!())
    }

    fn create_input_files_argument() -> Arg {
        Arg::new("input_files")
            .help("Paths to PPM or PGM plate photos")
            .value_parser(value_parser!(PathBuf))
            .action(ArgAction::Append)
            .num_args(1..)
            .required(true)
    }

    fn create_output_dir_argument() -> Arg {
        arg!(output_dir: -o --"output-dir" <DIR> "Directory receiving one TSV report per plate")
            .default_value(".")
            .value_parser(value_parser!(PathBuf))
    }

    fn create_rows_argument() -> Arg {
        arg!(rows: -r --rows <ROWS> "Number of grid rows on the plate")
            .default_value("8")
            .value_parser(value_parser!(u32).range(1..))
    }

    fn create_columns_argument() -> Arg {
        arg!(columns: -c --columns <COLUMNS> "Number of grid columns on the plate")
            .default_value("12")
            .value_parser(value_parser!(u32).range(1..))
    }

    fn create_threads_argument() -> Arg {
        arg!(-t --threads <THREADS> "Number of Threads")
            .default_value(get_number_of_threads().unwrap_or(1).to_string())
            .required(false)
            .value_parser(value_parser!(usize))
    }

    fn create_color_threshold_argument() -> Arg {
        arg!(color_threshold: --"color-threshold" <VALUE> "Relative color intensity above which a pixel counts as biofilm")
            .default_value(DEFAULT_COLOR_THRESHOLD.to_string())
            .value_parser(value_parser!(u8))
    }

    fn create_red_gain_argument() -> Arg {
        arg!(red_gain: --"red-gain" <GAIN> "Factor applied to the red channel")
            .default_value(DEFAULT_RED_GAIN.to_string())
            .value_parser(parse_gain)
    }

    fn create_blue_green_gain_argument() -> Arg {
        arg!(blue_green_gain: --"blue-green-gain" <GAIN> "Factor applied to green plus blue")
            .default_value(DEFAULT_BLUE_GREEN_GAIN.to_string())
            .value_parser(parse_gain)
    }

    fn create_grid_region_argument() -> Arg {
        arg!(grid_region: --"grid-region" <REGION> "Confirmed colony grid as x,y,width,height; skips detection")
            .required(false)
            .value_parser(parse_region)
    }

    fn create_tile_timeout_argument() -> Arg {
        arg!(tile_timeout: --"tile-timeout" <SECONDS> "Seconds to wait for a tile, 0 waits forever")
            .default_value(DEFAULT_TILE_TIMEOUT.as_secs().to_string())
            .value_parser(value_parser!(u64))
    }

    fn extract_arguments(matches: &ArgMatches) -> Arguments {
        Arguments {
            input_files: Self::extract_input_files_argument(matches),
            output_dir: Self::extract_output_dir_argument(matches),
            rows: Self::extract_rows_argument(matches),
            columns: Self::extract_columns_argument(matches),
            number_of_threads: Self::extract_threads_argument(matches),
            color_threshold: Self::extract_color_threshold_argument(matches),
            red_gain: Self::extract_red_gain_argument(matches),
            blue_green_gain: Self::extract_blue_green_gain_argument(matches),
            grid_region: Self::extract_grid_region_argument(matches),
            tile_timeout: Self::extract_tile_timeout_argument(matches),
        }
    }

    fn extract_input_files_argument(matches: &ArgMatches) -> Vec<PathBuf> {
        matches
            .get_many::<PathBuf>("input_files")
            .expect("Required argument input_files not provided")
            .cloned()
            .collect()
    }

    fn extract_output_dir_argument(matches: &ArgMatches) -> PathBuf {
        matches
            .get_one::<PathBuf>("output_dir")
            .expect("Output directory must be provided, but was unset.")
            .clone()
    }

    fn extract_rows_argument(matches: &ArgMatches) -> u32 {
        *matches
            .get_one::<u32>("rows")
            .expect("Number of rows must be provided, but was unset.")
    }

    fn extract_columns_argument(matches: &ArgMatches) -> u32 {
        *matches
            .get_one::<u32>("columns")
            .expect("Number of columns must be provided, but was unset.")
    }

    fn extract_threads_argument(matches: &ArgMatches) -> usize {
        matches
            .get_one::<usize>("threads")
            .expect("Required argument threads not provided")
            .to_owned()
    }

    fn extract_color_threshold_argument(matches: &ArgMatches) -> u8 {
        *matches
            .get_one::<u8>("color_threshold")
            .expect("Color threshold must be provided, but was unset.")
    }

    fn extract_red_gain_argument(matches: &ArgMatches) -> f32 {
        *matches
            .get_one::<f32>("red_gain")
            .expect("Red gain must be provided, but was unset.")
    }

    fn extract_blue_green_gain_argument(matches: &ArgMatches) -> f32 {
        *matches
            .get_one::<f32>("blue_green_gain")
            .expect("Blue green gain must be provided, but was unset.")
    }

    fn extract_grid_region_argument(matches: &ArgMatches) -> Option<Region> {
        matches.get_one::<Region>("grid_region").copied()
    }

    fn extract_tile_timeout_argument(matches: &ArgMatches) -> Option<Duration> {
        let seconds = *matches
            .get_one::<u64>("tile_timeout")
            .expect("Tile timeout must be provided, but was unset.");
        (seconds > 0).then(|| Duration::from_secs(seconds))
    }
}

impl Default for CLIParser {
    fn default() -> Self {
        Self::new()
    }
}

fn get_number_of_threads() -> io::Result<usize> {
    Ok(thread::available_parallelism()?.get())
}

fn parse_gain(value: &str) -> Result<f32, String> {
    let gain = value
        .parse::<f32>()
        .map_err(|e| format!("'{}' is not a number: {}", value, e))?;
    if !gain.is_finite() || gain <= 0.0 {
        return Err(format!("gain must be positive, got {}", value));
    }
    Ok(gain)
}

fn parse_region(value: &str) -> Result<Region, String> {
    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<u32>())
        .collect::<Result<Vec<u32>, _>>()
        .map_err(|e| format!("'{}' is not a list of integers: {}", value, e))?;
    match parts[..] {
        [x, y, width, height] if width > 0 && height > 0 => Ok(Region::new(x, y, width, height)),
        [_, _, _, _] => Err("region width and height must be positive".to_owned()),
        _ => Err(format!("expected x,y,width,height but got '{}'", value)),
    }
}
