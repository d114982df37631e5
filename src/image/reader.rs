use std::{fs::File, io::BufReader, path::Path};

use super::RgbImage;
use crate::{error::Error, Result};

mod ppm;

pub use ppm::PPMImageReader;

pub trait ImageReader {
    fn read_image(&mut self) -> Result<RgbImage>;
}

fn open_input_file(file_path: &Path) -> Result<File> {
    File::open(file_path).map_err(|e| {
        Error::UnableToOpenInputFileForReading(file_path.display().to_string(), e)
    })
}

/// Loads one plate photo. Any failure is reported as a plate load failure,
/// which ends processing of this plate only.
pub fn read_plate_image(file_path: &Path) -> Result<RgbImage> {
    let path = file_path.display().to_string();
    let file = open_input_file(file_path)
        .map_err(|e| Error::PlateLoadFailure(path.clone(), Box::new(e)))?;
    let mut reader = PPMImageReader::new(BufReader::new(file));
    reader
        .read_image()
        .map_err(|e| Error::PlateLoadFailure(path, Box::new(e)))
}
