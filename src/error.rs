use std::fmt::Display;

#[derive(Debug)]
pub enum Error {
    PPMFileDoesNotContainRequiredToken(&'static str),
    ParsingOfTokenFailed(&'static str),
    UnsupportedMagicNumber(String),
    UnsupportedMaxValue(u32),
    IncompletePixelParsed(usize),
    MismatchOfSizeBetweenHeaderAndValues,
    ColorValueExceedsMaxValue(u16, u16),
    UnableToOpenInputFileForReading(String, std::io::Error),
    UnableToOpenOutputFileForWriting(String, std::io::Error),
    FailedToReadImageData(std::io::Error),
    FailedToWriteReport(std::io::Error),
    RegionOutOfBounds {
        region: String,
        width: u32,
        height: u32,
    },
    GeometryPrecondition {
        dimension: &'static str,
        found: usize,
        required: usize,
    },
    EmptySearchRange(&'static str),
    SegmentationFailure(&'static str),
    PlateLoadFailure(String, Box<Error>),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PPMFileDoesNotContainRequiredToken(token_name) => {
                write!(f, "Expected token '{}' not found in PPM file", token_name)
            }
            Self::ParsingOfTokenFailed(token_name) => {
                write!(f, "Parsing of token '{}' failed", token_name)
            }
            Self::UnsupportedMagicNumber(magic) => {
                write!(
                    f,
                    "Unsupported magic number '{}'. Expected one of P2, P3, P5, P6.",
                    magic
                )
            }
            Self::UnsupportedMaxValue(max) => {
                write!(f, "Max value {} is not in range 1..=65535", max)
            }
            Self::IncompletePixelParsed(number_of_tokens_parsed) => {
                write!(
                    f,
                    "Incomplete pixel parsed. Expected 3 components, but got {}.",
                    number_of_tokens_parsed
                )
            }
            Self::MismatchOfSizeBetweenHeaderAndValues => {
                write!(
                    f,
                    "Number of pixels does not match the size provided in header"
                )
            }
            Self::ColorValueExceedsMaxValue(value, max) => {
                write!(
                    f,
                    "Color value {} is greater than max value of {}",
                    value, max
                )
            }
            Self::UnableToOpenInputFileForReading(path, error) => {
                write!(
                    f,
                    "Unable to open input file '{}' for reading: {}",
                    path, error
                )
            }
            Self::UnableToOpenOutputFileForWriting(path, error) => {
                write!(
                    f,
                    "Unable to open output file '{}' for writing: {}",
                    path, error
                )
            }
            Self::FailedToReadImageData(error) => {
                write!(f, "Failed to read image data: {}", error)
            }
            Self::FailedToWriteReport(error) => write!(f, "Failed to write report: {}", error),
            Self::RegionOutOfBounds {
                region,
                width,
                height,
            } => {
                write!(
                    f,
                    "Region {} does not fit into image of size {}x{}",
                    region, width, height
                )
            }
            Self::GeometryPrecondition {
                dimension,
                found,
                required,
            } => {
                write!(
                    f,
                    "Border search found {} foreground {}, but at least {} are required",
                    found, dimension, required
                )
            }
            Self::EmptySearchRange(side) => {
                write!(f, "Crop search range for {} side is empty", side)
            }
            Self::SegmentationFailure(reason) => write!(f, "Segmentation failed: {}", reason),
            Self::PlateLoadFailure(path, error) => {
                write!(f, "Unable to load plate '{}': {}", path, error)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::UnableToOpenInputFileForReading(_, error)
            | Self::UnableToOpenOutputFileForWriting(_, error)
            | Self::FailedToReadImageData(error)
            | Self::FailedToWriteReport(error) => Some(error),
            Self::PlateLoadFailure(_, error) => Some(error.as_ref()),
            _ => None,
        }
    }
}
